// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Wire envelopes used by the CleanLink REST API.
//!
//! Domain records (reports, users, audit entries) live in `cleanlink-model`
//! and `cleanlink-audit`; this module only holds request bodies and the
//! wrappers the backend puts around them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Nested error object: `{ "error": { "message": "..." } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Error body from the backend.
///
/// The documented shape is `{ error: { message } }`; older endpoints send
/// `{ error: "..." }` or a bare `{ message }`, so all three are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorEnvelope {
    Nested { error: ErrorDetail },
    Flat { error: String },
    Message { message: String },
}

impl ErrorEnvelope {
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            ErrorEnvelope::Nested { error } => error.message.as_deref(),
            ErrorEnvelope::Flat { error } => Some(error.as_str()),
            ErrorEnvelope::Message { message } => Some(message.as_str()),
        };
        message.filter(|m| !m.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Generic wrapper for paginated list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The result items for the current page.
    pub data: Vec<T>,
    /// Total number of matching items across all pages.
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub has_more: bool,
}

/// A list endpoint's body: either paginated or a bare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Page(PaginatedResponse<T>),
}

impl<T> ListResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Page(page) => page.data,
        }
    }
}

/// A single record, bare or under a `data` / `user` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Bare(T),
    Data { data: T },
    User { user: T },
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Bare(value) | Envelope::Data { data: value } | Envelope::User { user: value } => value,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /reports/{id}/reject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shapes() {
        let nested: ErrorEnvelope =
            serde_json::from_str(r#"{"error": {"message": "Report not pending"}}"#).unwrap();
        assert_eq!(nested.message(), Some("Report not pending"));

        let flat: ErrorEnvelope = serde_json::from_str(r#"{"error": "Forbidden"}"#).unwrap();
        assert_eq!(flat.message(), Some("Forbidden"));

        let bare: ErrorEnvelope = serde_json::from_str(r#"{"message": "Down"}"#).unwrap();
        assert_eq!(bare.message(), Some("Down"));

        let empty: ErrorEnvelope = serde_json::from_str(r#"{"error": {}}"#).unwrap();
        assert!(empty.message().is_none());
    }

    #[test]
    fn test_list_response_shapes() {
        let bare: ListResponse<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(bare.into_items(), vec![1, 2, 3]);

        let page: ListResponse<u32> =
            serde_json::from_str(r#"{"data": [4], "total": 9, "has_more": true}"#).unwrap();
        assert_eq!(page.into_items(), vec![4]);

        let wrapped: ListResponse<u32> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(wrapped.into_items().is_empty());
    }

    #[test]
    fn test_envelope_shapes() {
        let user: Envelope<cleanlink_model::User> =
            serde_json::from_str(r#"{"user": {"id": 4, "role": "admin"}}"#).unwrap();
        assert_eq!(user.into_inner().id, "4");

        let report: Envelope<cleanlink_model::Report> =
            serde_json::from_str(r#"{"id": "r1", "status": "resolved"}"#).unwrap();
        assert_eq!(report.into_inner().id, "r1");

        let data: Envelope<cleanlink_model::Report> =
            serde_json::from_str(r#"{"data": {"id": 8}}"#).unwrap();
        assert_eq!(data.into_inner().id, "8");
    }
}
