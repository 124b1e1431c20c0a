// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Action-type mapping.
//!
//! The backend names actions in its own underscore vocabulary. The display
//! layer uses a smaller set of canonical names. The mapping is data, held in
//! [`ACTION_MAPPING`], and applied in three ordered steps after the raw
//! value is trimmed and lowercased:
//!
//! 1. A value in the exact set passes through unchanged.
//! 2. Otherwise the `report_` prefix is stripped.
//! 3. Otherwise the lowercased value is kept as-is.
//!
//! A missing or blank value, or one that strips down to nothing, maps to
//! the default `updated`. The mapping is total and deterministic.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered rule table for raw → canonical action names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMapping {
    /// Canonical names that pass through untouched.
    pub exact: &'static [&'static str],
    /// Prefix stripped from anything not in `exact`.
    pub strip_prefix: &'static str,
    /// Result for missing or empty input.
    pub default: &'static str,
}

/// The mapping used by the normalizer.
pub const ACTION_MAPPING: ActionMapping = ActionMapping {
    exact: &[
        "report_resolved",
        "work_approved",
        "work_rejected",
        "points_awarded",
        "user_level_up",
    ],
    strip_prefix: "report_",
    default: "updated",
};

impl ActionMapping {
    /// Map a raw backend action type to its canonical name.
    pub fn apply(&self, raw: Option<&str>) -> String {
        let lowered = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return self.default.to_string(),
        };

        if self.exact.contains(&lowered.as_str()) {
            return lowered;
        }

        match lowered.strip_prefix(self.strip_prefix) {
            Some("") => self.default.to_string(),
            Some(rest) => rest.to_string(),
            None => lowered,
        }
    }
}

/// Map a raw action type with [`ACTION_MAPPING`].
pub fn map_action_type(raw: Option<&str>) -> AuditAction {
    AuditAction::from_canonical(&ACTION_MAPPING.apply(raw))
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Canonical action name shown in audit timelines.
///
/// Known names get their own variant so views can pick icons by matching;
/// anything else the backend invents later lands in `Other`, lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Created,
    Updated,
    Assigned,
    StatusChanged,
    Resolved,
    Flagged,
    Verified,
    Commented,
    ReportResolved,
    WorkApproved,
    WorkRejected,
    PointsAwarded,
    UserLevelUp,
    Other(String),
}

impl AuditAction {
    /// Wrap an already-canonical name. Does not apply the mapping rules.
    pub fn from_canonical(name: &str) -> Self {
        match name {
            "created" => AuditAction::Created,
            "updated" => AuditAction::Updated,
            "assigned" => AuditAction::Assigned,
            "status_changed" => AuditAction::StatusChanged,
            "resolved" => AuditAction::Resolved,
            "flagged" => AuditAction::Flagged,
            "verified" => AuditAction::Verified,
            "commented" => AuditAction::Commented,
            "report_resolved" => AuditAction::ReportResolved,
            "work_approved" => AuditAction::WorkApproved,
            "work_rejected" => AuditAction::WorkRejected,
            "points_awarded" => AuditAction::PointsAwarded,
            "user_level_up" => AuditAction::UserLevelUp,
            other => AuditAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Assigned => "assigned",
            AuditAction::StatusChanged => "status_changed",
            AuditAction::Resolved => "resolved",
            AuditAction::Flagged => "flagged",
            AuditAction::Verified => "verified",
            AuditAction::Commented => "commented",
            AuditAction::ReportResolved => "report_resolved",
            AuditAction::WorkApproved => "work_approved",
            AuditAction::WorkRejected => "work_rejected",
            AuditAction::PointsAwarded => "points_awarded",
            AuditAction::UserLevelUp => "user_level_up",
            AuditAction::Other(name) => name,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(AuditAction::from_canonical(&name))
    }
}
