// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Normalized audit record consumed by report-detail views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::AuditAction;

/// Actor name and role used when the backend records no actor.
pub const SYSTEM_ACTOR: &str = "System";

/// Before/after pair for one edited field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub before: Value,
    pub after: Value,
}

/// Canonical audit-log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub report_id: String,
    pub action_type: AuditAction,
    /// Username, email, or `"System"`.
    pub actor: String,
    /// Role of the actor, or `"System"`.
    pub actor_role: String,
    /// Timestamp as sent by the backend; empty when missing.
    pub timestamp: String,
    pub changes: BTreeMap<String, FieldChange>,
    /// Single display line; empty when the entry carries none.
    pub details: String,
    /// Present only when an after-photo was attached. Absent and empty mean
    /// the same thing to callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

impl AuditEntry {
    /// Parse [`AuditEntry::timestamp`] as RFC 3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Photos as a slice; empty when none were attached.
    pub fn photos(&self) -> &[String] {
        self.photos.as_deref().unwrap_or(&[])
    }

    pub fn is_system(&self) -> bool {
        self.actor == SYSTEM_ACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AuditEntry {
        AuditEntry {
            id: "1".into(),
            report_id: "r-1".into(),
            action_type: AuditAction::WorkApproved,
            actor: SYSTEM_ACTOR.into(),
            actor_role: SYSTEM_ACTOR.into(),
            timestamp: "2026-05-04T08:30:00+02:00".into(),
            changes: BTreeMap::new(),
            details: String::new(),
            photos: None,
        }
    }

    #[test]
    fn test_serializes_camel_case_without_photos() {
        let json = serde_json::to_value(entry()).unwrap();
        assert_eq!(json["reportId"], "r-1");
        assert_eq!(json["actionType"], "work_approved");
        assert_eq!(json["actorRole"], "System");
        assert!(json.get("photos").is_none());
    }

    #[test]
    fn test_parsed_timestamp_converts_to_utc() {
        let ts = entry().parsed_timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-05-04T06:30:00+00:00");

        let mut e = entry();
        e.timestamp = "yesterday".into();
        assert!(e.parsed_timestamp().is_none());
    }

    #[test]
    fn test_photos_accessor() {
        let mut e = entry();
        assert!(e.photos().is_empty());
        assert!(e.is_system());
        e.photos = Some(vec!["https://cdn.example.org/a.jpg".into()]);
        assert_eq!(e.photos().len(), 1);
    }
}
