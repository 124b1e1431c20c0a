// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Raw → canonical audit normalization.
//!
//! One raw entry in, one [`AuditEntry`] out, same order. Nothing is filtered
//! or reordered. Missing pieces fall back to defaults:
//!
//! | Field       | Source (first present wins)                       | Default    |
//! |-------------|---------------------------------------------------|------------|
//! | actionType  | `action_type` via [`ACTION_MAPPING`]              | `updated`  |
//! | actor       | `actor.username`, `actor.email`                   | `System`   |
//! | actorRole   | `actor.role`                                      | `System`   |
//! | details     | `notes`, `reason`, `rejection_reason`             | `""`       |
//! | photos      | `details.cleaned_image_url`                       | omitted    |
//! | changes     | `details.changes`                                 | empty map  |
//!
//! [`ACTION_MAPPING`]: crate::action::ACTION_MAPPING

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::action::map_action_type;
use crate::detail::AuditDetail;
use crate::entry::{AuditEntry, FieldChange, SYSTEM_ACTOR};
use crate::raw::RawAuditEntry;

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Pull a before/after pair out of one `changes` value.
///
/// Accepts `{old, new}` and `{before, after}`; anything else is skipped.
fn field_change(value: &Value) -> Option<FieldChange> {
    let obj = value.as_object()?;
    let before = obj.get("old").or_else(|| obj.get("before"));
    let after = obj.get("new").or_else(|| obj.get("after"));
    if before.is_none() && after.is_none() {
        return None;
    }
    Some(FieldChange {
        before: before.cloned().unwrap_or(Value::Null),
        after: after.cloned().unwrap_or(Value::Null),
    })
}

fn collect_changes(changes: Option<&Map<String, Value>>) -> BTreeMap<String, FieldChange> {
    changes
        .into_iter()
        .flatten()
        .filter_map(|(field, value)| field_change(value).map(|c| (field.clone(), c)))
        .collect()
}

/// Normalize a single raw entry.
pub fn normalize_entry(raw: &RawAuditEntry) -> AuditEntry {
    let actor = raw.actor.as_ref();
    let actor_name = actor
        .and_then(|a| present(a.username.as_deref()).or_else(|| present(a.email.as_deref())))
        .unwrap_or(SYSTEM_ACTOR);
    let actor_role = actor
        .and_then(|a| present(a.role.as_deref()))
        .unwrap_or(SYSTEM_ACTOR);

    let details = raw.details.as_ref();
    let detail = details.map_or(AuditDetail::None, |d| d.classify());
    let photos = details
        .and_then(|d| d.photo())
        .map(|url| vec![url.to_string()]);
    let changes = collect_changes(details.and_then(|d| d.changes.as_ref()));

    AuditEntry {
        id: raw.id.clone().unwrap_or_default(),
        report_id: raw.target_id.clone().unwrap_or_default(),
        action_type: map_action_type(raw.action_type.as_deref()),
        actor: actor_name.to_string(),
        actor_role: actor_role.to_string(),
        timestamp: raw.created_at.clone().unwrap_or_default(),
        changes,
        details: detail.text().to_string(),
        photos,
    }
}

/// Normalize a batch, preserving order and length.
pub fn normalize_entries(raw: &[RawAuditEntry]) -> Vec<AuditEntry> {
    let entries: Vec<AuditEntry> = raw.iter().map(normalize_entry).collect();
    debug!(count = entries.len(), "normalized audit entries");
    entries
}
