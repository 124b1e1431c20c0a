// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # CleanLink Client SDK
//!
//! A Rust client for the CleanLink admin surfaces: the pending-approval
//! queue, per-report audit history, and report submission. Reads go through
//! a shared query cache with bounded retries; approve/reject decisions are
//! mutations that invalidate the affected queries and emit notifications.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cleanlink_client::approvals::ApprovalWorkflow;
//! use cleanlink_client::cache::QueryCache;
//! use cleanlink_client::client::CleanLinkClient;
//! use cleanlink_client::config::ClientConfig;
//! use cleanlink_client::notify::TracingNotifier;
//!
//! #[tokio::main]
//! async fn main() -> cleanlink_client::error::Result<()> {
//!     let config = ClientConfig::default();
//!     let client = Arc::new(CleanLinkClient::new(&config)?.with_token("jwt"));
//!     let workflow = ApprovalWorkflow::from_config(
//!         client,
//!         Arc::new(QueryCache::new()),
//!         Arc::new(TracingNotifier),
//!         &config,
//!     );
//!     for item in workflow.pending().await? {
//!         println!("{} awaiting approval", item.id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] -- Base URL, bearer auth, and HTTP transport.
//! - [`config`] -- `ClientConfig` / `RetryConfig`.
//! - [`api`] -- The `ApprovalsApi` / `AuditLogApi` seams.
//! - [`approvals`] -- `ApprovalWorkflow`: pending list, approve, reject.
//! - [`audit`] -- `AuditLogQuery`: cached, normalized audit history.
//! - [`reports`] -- Single-report fetch, submission, and the `/me` profile.
//! - [`cache`] -- Keyed query cache with prefix invalidation.
//! - [`retry`] -- Backoff policy for read queries.
//! - [`notify`] -- Success/error notifications.
//! - [`types`] -- Wire envelopes.
//! - [`error`] -- Error types and the crate-level `Result` alias.

pub mod api;
pub mod approvals;
pub mod audit;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod reports;
pub mod retry;
pub mod types;

pub use api::{ApprovalsApi, AuditLogApi};
pub use approvals::ApprovalWorkflow;
pub use audit::AuditLogQuery;
pub use cache::{QueryCache, QueryKey, QueryState, QueryStatus};
pub use client::CleanLinkClient;
pub use config::{ClientConfig, RetryConfig};
pub use error::{ClientError, Result};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, NullNotifier, TracingNotifier};
pub use retry::RetryPolicy;
