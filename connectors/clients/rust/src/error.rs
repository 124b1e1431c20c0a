// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the CleanLink client SDK.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, ClientError>`. Authorization denials are *not*
//! errors; they are booleans from `cleanlink-policy`. What lands here are
//! transport failures, backend rejections, and client-side validation.

use cleanlink_model::ValidationErrors;
use thiserror::Error;

fn describe(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no message")
}

/// Error type for CleanLink client operations.
///
/// Remote variants carry the message from the backend's
/// `{ "error": { "message": ... } }` envelope when there was one.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The requested report or resource does not exist (HTTP 404).
    #[error("Not found: {}", describe(.0))]
    NotFound(Option<String>),

    /// Authentication or authorization failed (HTTP 401 / 403).
    #[error("Unauthorized: {}", describe(.0))]
    Unauthorized(Option<String>),

    /// The backend is temporarily unavailable (HTTP 503). Never retried.
    #[error("Service unavailable: {}", describe(.0))]
    ServiceUnavailable(Option<String>),

    /// Any other non-2xx response.
    #[error("Server error ({status}): {}", describe(.message))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// An underlying HTTP / network transport error from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A precondition failed before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A report draft failed field-level validation.
    #[error("Invalid report draft: {0}")]
    InvalidDraft(#[from] ValidationErrors),

    /// A cancellation, or a fetch started after an invalidation, replaced
    /// this one; its result was discarded without touching cached state.
    #[error("Query superseded: {0}")]
    Superseded(String),

    /// A mutation for the same report is already running.
    #[error("Mutation already in flight for report {0}")]
    MutationInFlight(String),

    /// A background mutation task ended abnormally.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A transport or decoding failure seen by another reader's fetch,
    /// reduced to its message.
    #[error("Shared fetch failed: {0}")]
    SharedFetch(String),
}

impl ClientError {
    /// The backend-provided message, if the response carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::NotFound(m)
            | ClientError::Unauthorized(m)
            | ClientError::ServiceUnavailable(m)
            | ClientError::Server { message: m, .. } => {
                m.as_deref().filter(|s| !s.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Whether a read query may be retried after this error.
    ///
    /// Remote and transport failures are retryable, except the
    /// service-unavailable class. Local failures never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::NotFound(_)
                | ClientError::Unauthorized(_)
                | ClientError::Server { .. }
                | ClientError::Network(_)
                | ClientError::Timeout(_)
        )
    }

    /// Copy of this error for every reader that shared one fetch.
    ///
    /// Network and serialization sources cannot be cloned, so those copies
    /// keep only the message.
    pub fn replicate(&self) -> ClientError {
        match self {
            ClientError::NotFound(m) => ClientError::NotFound(m.clone()),
            ClientError::Unauthorized(m) => ClientError::Unauthorized(m.clone()),
            ClientError::ServiceUnavailable(m) => ClientError::ServiceUnavailable(m.clone()),
            ClientError::Server { status, message } => ClientError::Server {
                status: *status,
                message: message.clone(),
            },
            ClientError::Timeout(ms) => ClientError::Timeout(*ms),
            ClientError::Validation(m) => ClientError::Validation(m.clone()),
            ClientError::InvalidDraft(errors) => ClientError::InvalidDraft(errors.clone()),
            ClientError::Superseded(k) => ClientError::Superseded(k.clone()),
            ClientError::MutationInFlight(id) => ClientError::MutationInFlight(id.clone()),
            ClientError::Internal(m) => ClientError::Internal(m.clone()),
            ClientError::SharedFetch(m) => ClientError::SharedFetch(m.clone()),
            ClientError::Network(_) | ClientError::Serialization(_) => {
                ClientError::SharedFetch(self.to_string())
            }
        }
    }

    /// Build the variant matching an HTTP status code.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            404 => ClientError::NotFound(message),
            401 | 403 => ClientError::Unauthorized(message),
            503 => ClientError::ServiceUnavailable(message),
            _ => ClientError::Server { status, message },
        }
    }
}

/// Crate-level result alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ClientError::from_status(404, None), ClientError::NotFound(None)));
        assert!(matches!(ClientError::from_status(403, None), ClientError::Unauthorized(None)));
        assert!(matches!(
            ClientError::from_status(503, None),
            ClientError::ServiceUnavailable(None)
        ));
        assert!(matches!(
            ClientError::from_status(500, None),
            ClientError::Server { status: 500, .. }
        ));
    }

    #[test]
    fn test_server_message() {
        let err = ClientError::from_status(422, Some("Report already resolved".into()));
        assert_eq!(err.server_message(), Some("Report already resolved"));
        assert_eq!(err.to_string(), "Server error (422): Report already resolved");

        let err = ClientError::from_status(500, Some("  ".into()));
        assert!(err.server_message().is_none());

        let err = ClientError::from_status(404, None);
        assert!(err.server_message().is_none());
        assert_eq!(err.to_string(), "Not found: no message");

        assert!(ClientError::Validation("x".into()).server_message().is_none());
    }

    #[test]
    fn test_retryability() {
        assert!(ClientError::from_status(500, None).is_retryable());
        assert!(ClientError::Timeout(30_000).is_retryable());
        assert!(!ClientError::from_status(503, None).is_retryable());
        assert!(!ClientError::Validation("empty".into()).is_retryable());
        assert!(!ClientError::Superseded("k".into()).is_retryable());
        assert!(!ClientError::MutationInFlight("r".into()).is_retryable());
        assert!(!ClientError::SharedFetch("reset".into()).is_retryable());
    }

    #[test]
    fn test_replicate_keeps_variant_and_message() {
        let err = ClientError::from_status(409, Some("Report is not awaiting approval".into()));
        let copy = err.replicate();
        assert!(matches!(copy, ClientError::Server { status: 409, .. }));
        assert_eq!(copy.server_message(), Some("Report is not awaiting approval"));

        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ClientError::from(decode);
        match err.replicate() {
            ClientError::SharedFetch(message) => assert_eq!(message, err.to_string()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
