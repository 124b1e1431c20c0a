// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Identifier helpers.
//!
//! The backend is inconsistent about identifiers: some endpoints return
//! numeric ids, others UUID strings. Every id is carried as a `String` on the
//! Rust side and these serde helpers accept either form.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Deserialize a required id from a JSON string or number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Deserialize an optional id from a JSON string, number or `null`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        parent: Option<String>,
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let h: Holder = serde_json::from_str(r#"{"id": 42, "parent": "abc"}"#).unwrap();
        assert_eq!(h.id, "42");
        assert_eq!(h.parent.as_deref(), Some("abc"));

        let h: Holder = serde_json::from_str(r#"{"id": "r-7"}"#).unwrap();
        assert_eq!(h.id, "r-7");
        assert!(h.parent.is_none());

        let h: Holder = serde_json::from_str(r#"{"id": "r-8", "parent": null}"#).unwrap();
        assert!(h.parent.is_none());
    }
}
