// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Typed view over the `details` bag.

use serde::{Deserialize, Serialize};

use crate::raw::RawDetails;

/// The display-relevant part of an entry's details.
///
/// Detail shapes are checked in a fixed order: notes, then reason, then
/// rejection reason. The first non-empty one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AuditDetail {
    /// Notes left when resolving or approving work.
    ResolutionNotes(String),
    /// Generic reason (flagging, reassignment, status change).
    Reason(String),
    /// Why submitted work was sent back.
    RejectionReason(String),
    None,
}

impl AuditDetail {
    /// Display text; empty for [`AuditDetail::None`].
    pub fn text(&self) -> &str {
        match self {
            AuditDetail::ResolutionNotes(s)
            | AuditDetail::Reason(s)
            | AuditDetail::RejectionReason(s) => s,
            AuditDetail::None => "",
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_owned)
}

impl RawDetails {
    /// Classify the bag into an [`AuditDetail`].
    pub fn classify(&self) -> AuditDetail {
        if let Some(notes) = non_empty(&self.notes) {
            AuditDetail::ResolutionNotes(notes)
        } else if let Some(reason) = non_empty(&self.reason) {
            AuditDetail::Reason(reason)
        } else if let Some(reason) = non_empty(&self.rejection_reason) {
            AuditDetail::RejectionReason(reason)
        } else {
            AuditDetail::None
        }
    }

    /// After-photo URL when one was attached.
    pub fn photo(&self) -> Option<&str> {
        self.cleaned_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}
