// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! CleanLink Audit
//!
//! Turns the backend's loosely-shaped audit-log entries into one canonical
//! display record. Normalization never fails: missing actors, details or
//! action types fall back to defaults instead of rejecting the batch.
//!
//! # Modules
//!
//! - [`raw`] -- Backend-shaped entries, parsed leniently.
//! - [`action`] -- The raw → canonical action-type mapping table.
//! - [`detail`] -- Typed view over the `details` bag.
//! - [`entry`] -- The normalized [`AuditEntry`].
//! - [`normalize`] -- [`normalize_entries`] / [`normalize_entry`].
//!
//! # Example
//!
//! ```rust
//! use cleanlink_audit::{normalize_entries, RawAuditEntry};
//!
//! let raw: Vec<RawAuditEntry> = serde_json::from_str(
//!     r#"[{"action_type": "REPORT_RESOLVED", "target_id": 7, "details": {"notes": "done"}}]"#,
//! ).unwrap();
//! let entries = normalize_entries(&raw);
//! assert_eq!(entries[0].action_type.as_str(), "report_resolved");
//! assert_eq!(entries[0].report_id, "7");
//! assert_eq!(entries[0].actor, "System");
//! assert_eq!(entries[0].details, "done");
//! ```

pub mod action;
pub mod detail;
pub mod entry;
pub mod normalize;
pub mod raw;

pub use action::{map_action_type, ActionMapping, AuditAction, ACTION_MAPPING};
pub use detail::AuditDetail;
pub use entry::{AuditEntry, FieldChange, SYSTEM_ACTOR};
pub use normalize::{normalize_entries, normalize_entry};
pub use raw::{RawActor, RawAuditEntry, RawDetails};
