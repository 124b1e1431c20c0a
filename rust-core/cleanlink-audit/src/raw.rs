// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Backend-shaped audit entries.
//!
//! Every field is optional and parsed leniently: a field of the wrong JSON
//! type is dropped to `None` rather than failing the entry, so one odd
//! record cannot take down a whole audit log.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use cleanlink_model::id::opt_string_or_number;

/// Deserialize any JSON value, then keep it only if it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Id fields that may arrive as strings, numbers, or garbage.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| opt_string_or_number(v).ok().flatten()))
}

/// Who performed the action, as embedded by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActor {
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
}

/// The loosely-typed `details` bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetails {
    /// Resolution or approval notes.
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rejection_reason: Option<String>,
    /// After-photo attached when field work is submitted.
    #[serde(default, deserialize_with = "lenient")]
    pub cleaned_image_url: Option<String>,
    /// `{ field: { old|before, new|after } }` when the action edited fields.
    #[serde(default, deserialize_with = "lenient")]
    pub changes: Option<Map<String, Value>>,
}

/// One audit-log record exactly as the backend serves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAuditEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    /// Backend vocabulary, e.g. `REPORT_STATUS_CHANGED` or `work_approved`.
    #[serde(default, deserialize_with = "lenient")]
    pub action_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub actor: Option<RawActor>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: Option<RawDetails>,
    /// Id of the report the action applies to.
    #[serde(default, deserialize_with = "lenient_id")]
    pub target_id: Option<String>,
}
