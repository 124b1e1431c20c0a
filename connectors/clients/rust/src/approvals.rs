// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Pending-approval queue: listing, approve and reject.
//!
//! The list is a cached query. A decision is a mutation: it runs on its own
//! tokio task so dropping the caller's future cannot abort a request the
//! server may already have applied. On success the mutation invalidates the
//! pending list and the report's audit log, then emits one success
//! notification. On failure it emits one error notification and leaves every
//! cached query untouched, so the item stays listed.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};

use cleanlink_model::PendingApproval;

use crate::api::ApprovalsApi;
use crate::cache::{QueryCache, QueryKey, QueryState};
use crate::client::CleanLinkClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::notify::{Notification, Notifier};
use crate::retry::RetryPolicy;
use crate::types::{ListResponse, RejectRequest};

pub const APPROVED_MESSAGE: &str = "Work approved";
pub const REJECTED_MESSAGE: &str = "Work rejected";
pub const APPROVE_FAILED_MESSAGE: &str = "Failed to approve work";
pub const REJECT_FAILED_MESSAGE: &str = "Failed to reject work";

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl ApprovalsApi for CleanLinkClient {
    async fn list_pending_approvals(&self, limit: usize) -> Result<Vec<PendingApproval>> {
        let mut url = self.endpoint(&["pending-approvals"])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let body: ListResponse<PendingApproval> = self.get(url).await?;
        Ok(body.into_items())
    }

    async fn approve_report(&self, report_id: &str) -> Result<()> {
        let url = self.endpoint(&["reports", report_id, "approve"])?;
        self.post_command::<()>(url, None).await
    }

    async fn reject_report(&self, report_id: &str, reason: &str) -> Result<()> {
        let url = self.endpoint(&["reports", report_id, "reject"])?;
        let body = RejectRequest {
            reason: reason.to_string(),
        };
        self.post_command(url, Some(&body)).await
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject { reason: String },
}

impl Decision {
    fn success_message(&self) -> &'static str {
        match self {
            Decision::Approve => APPROVED_MESSAGE,
            Decision::Reject { .. } => REJECTED_MESSAGE,
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Decision::Approve => APPROVE_FAILED_MESSAGE,
            Decision::Reject { .. } => REJECT_FAILED_MESSAGE,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Reject { .. } => write!(f, "reject"),
        }
    }
}

/// Marks a report as having a mutation in flight until dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    report_id: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, report_id: &str) -> Result<Self> {
        let mut set = in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(report_id.to_string()) {
            return Err(ClientError::MutationInFlight(report_id.to_string()));
        }
        Ok(Self {
            in_flight: Arc::clone(in_flight),
            report_id: report_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.report_id);
    }
}

fn require_report_id(report_id: &str) -> Result<String> {
    let trimmed = report_id.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation("report id must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// ApprovalWorkflow
// ---------------------------------------------------------------------------

/// Controller behind the admin approval queue.
pub struct ApprovalWorkflow<A: ApprovalsApi> {
    api: Arc<A>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    limit: usize,
    retry: RetryPolicy,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<A: ApprovalsApi> Clone for ApprovalWorkflow<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            notifier: Arc::clone(&self.notifier),
            limit: self.limit,
            retry: self.retry.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A: ApprovalsApi> ApprovalWorkflow<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            api,
            cache,
            notifier,
            limit: defaults.pending_limit,
            retry: RetryPolicy::from_config(&defaults.retry),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Take the page size and retry policy from `config`.
    pub fn from_config(
        api: Arc<A>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        config: &ClientConfig,
    ) -> Self {
        Self::new(api, cache, notifier)
            .with_limit(config.pending_limit)
            .with_retry(RetryPolicy::from_config(&config.retry))
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::pending_approvals_page(self.limit)
    }

    /// Pending items, from cache when fresh.
    pub async fn pending(&self) -> Result<Vec<PendingApproval>> {
        let api: &A = &self.api;
        let limit = self.limit;
        self.cache
            .fetch(&self.key(), &self.retry, move || api.list_pending_approvals(limit))
            .await
    }

    /// Pending items straight from the backend.
    pub async fn refresh(&self) -> Result<Vec<PendingApproval>> {
        let api: &A = &self.api;
        let limit = self.limit;
        self.cache
            .refetch(&self.key(), &self.retry, move || api.list_pending_approvals(limit))
            .await
    }

    pub async fn state(&self) -> QueryState<Vec<PendingApproval>> {
        self.cache.state(&self.key()).await
    }

    pub fn is_in_flight(&self, report_id: &str) -> bool {
        let set = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set.contains(report_id.trim())
    }

    /// Approve the submitted work for `report_id`.
    pub async fn approve(&self, report_id: &str) -> Result<()> {
        let report_id = require_report_id(report_id)?;
        self.run(report_id, Decision::Approve).await
    }

    /// Reject the submitted work for `report_id`. `reason` is sent as given
    /// but must contain something other than whitespace.
    pub async fn reject(&self, report_id: &str, reason: &str) -> Result<()> {
        let report_id = require_report_id(report_id)?;
        if reason.trim().is_empty() {
            return Err(ClientError::Validation("rejection reason must not be empty".into()));
        }
        self.run(
            report_id,
            Decision::Reject {
                reason: reason.to_string(),
            },
        )
        .await
    }

    async fn run(&self, report_id: String, decision: Decision) -> Result<()> {
        let guard = InFlightGuard::acquire(&self.in_flight, &report_id)?;
        let api = Arc::clone(&self.api);
        let cache = Arc::clone(&self.cache);
        let notifier = Arc::clone(&self.notifier);

        let task = tokio::spawn(async move {
            let _guard = guard;
            let outcome = match &decision {
                Decision::Approve => api.approve_report(&report_id).await,
                Decision::Reject { reason } => api.reject_report(&report_id, reason).await,
            };

            match outcome {
                Ok(()) => {
                    info!(report_id = %report_id, action = %decision, "work decision recorded");
                    cache.invalidate_prefix(&QueryKey::pending_approvals()).await;
                    cache.invalidate_prefix(&QueryKey::audit_logs(&report_id)).await;
                    notifier.notify(Notification::success(decision.success_message()));
                    Ok(())
                }
                Err(err) => {
                    warn!(report_id = %report_id, action = %decision, error = %err, "work decision failed");
                    let message = err
                        .server_message()
                        .map(str::to_owned)
                        .unwrap_or_else(|| decision.failure_message().to_string());
                    notifier.notify(Notification::error(message));
                    Err(err)
                }
            }
        });

        task.await
            .map_err(|e| ClientError::Internal(format!("mutation task ended abnormally: {e}")))?
    }
}
