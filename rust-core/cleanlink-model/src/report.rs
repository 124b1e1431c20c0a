// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Reports and the approval queue.
//!
//! Only the fields that authorization and the approval workflow read are
//! modelled; the backend owns the full record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{opt_string_or_number, string_or_number};

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Filed, not yet triaged.
    #[default]
    Pending,
    /// Triaged and handed to a field team.
    Assigned,
    InProgress,
    /// Work submitted, waiting for an admin decision.
    PendingApproval,
    /// Submitted work was rejected and must be redone.
    NeedsRevision,
    Resolved,
    Flagged,
    Duplicate,
    /// Confirmed by enough citizens to skip manual triage.
    CommunityVerified,
    #[serde(other)]
    Unknown,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Assigned => "assigned",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::PendingApproval => "pending_approval",
            ReportStatus::NeedsRevision => "needs_revision",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Flagged => "flagged",
            ReportStatus::Duplicate => "duplicate",
            ReportStatus::CommunityVerified => "community_verified",
            ReportStatus::Unknown => "unknown",
        }
    }

    /// Terminal states accept no further workflow transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Duplicate)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen report, as far as this client needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text locality, compared against the admin's region.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn new(id: impl Into<String>, region: Option<&str>, status: ReportStatus) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            category: None,
            region: region.map(str::to_owned),
            status,
            created_at: None,
        }
    }
}

/// A report whose field work awaits an admin's approve/reject decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingApproval {
    #[serde(flatten)]
    pub report: Report,
    /// Photo of the site after the work was done.
    #[serde(default)]
    pub cleaned_image_url: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    /// Id of the field worker who submitted the work.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl PendingApproval {
    pub fn id(&self) -> &str {
        &self.report.id
    }
}
