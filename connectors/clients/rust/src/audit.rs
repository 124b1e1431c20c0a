// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Per-report audit history.
//!
//! Raw entries are cached under `["audit-logs", id]` exactly as served and
//! normalized on every read, so an approval that invalidates the key is
//! reflected on the next fetch.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cleanlink_audit::{normalize_entries, AuditEntry, RawAuditEntry};
use cleanlink_model::Report;
use cleanlink_policy::AdminPolicy;

use crate::api::AuditLogApi;
use crate::cache::{QueryCache, QueryKey, QueryState, QueryStatus};
use crate::client::CleanLinkClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::retry::RetryPolicy;
use crate::types::ListResponse;

#[async_trait]
impl AuditLogApi for CleanLinkClient {
    async fn list_audit_logs(&self, report_id: &str) -> Result<Vec<RawAuditEntry>> {
        let url = self.endpoint(&["reports", report_id, "audit-logs"])?;
        let body: ListResponse<RawAuditEntry> = self.get(url).await?;
        Ok(body.into_items())
    }
}

/// Audit-log reader for the report detail view.
pub struct AuditLogQuery<A: AuditLogApi> {
    api: Arc<A>,
    cache: Arc<QueryCache>,
    retry: RetryPolicy,
}

impl<A: AuditLogApi> Clone for AuditLogQuery<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            retry: self.retry.clone(),
        }
    }
}

impl<A: AuditLogApi> AuditLogQuery<A> {
    pub fn new(api: Arc<A>, cache: Arc<QueryCache>) -> Self {
        Self {
            api,
            cache,
            retry: RetryPolicy::default(),
        }
    }

    /// Take the retry policy from `config`.
    pub fn from_config(api: Arc<A>, cache: Arc<QueryCache>, config: &ClientConfig) -> Self {
        Self::new(api, cache).with_retry(RetryPolicy::from_config(&config.retry))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Normalized history for `report_id`, oldest-first as served.
    pub async fn fetch(&self, report_id: &str) -> Result<Vec<AuditEntry>> {
        let report_id = report_id.trim();
        if report_id.is_empty() {
            return Err(ClientError::Validation("report id must not be empty".into()));
        }
        let api: &A = &self.api;
        let raw: Vec<RawAuditEntry> = self
            .cache
            .fetch(&QueryKey::audit_logs(report_id), &self.retry, move || {
                api.list_audit_logs(report_id)
            })
            .await?;
        Ok(normalize_entries(&raw))
    }

    /// History as the given policy may see it.
    ///
    /// A session that cannot view the audit log gets an empty list and no
    /// request is made.
    pub async fn visible(&self, policy: &AdminPolicy, report: &Report) -> Result<Vec<AuditEntry>> {
        if !policy.can_view_audit_log(report) {
            debug!(report_id = %report.id, "audit log hidden for this session");
            return Ok(Vec::new());
        }
        self.fetch(&report.id).await
    }

    /// Stop tracking `report_id`'s history, discarding any fetch in flight.
    pub async fn release(&self, report_id: &str) {
        self.cache.cancel(&QueryKey::audit_logs(report_id.trim())).await;
    }

    pub async fn state(&self, report_id: &str) -> QueryState<Vec<AuditEntry>> {
        let raw: QueryState<Vec<RawAuditEntry>> =
            self.cache.state(&QueryKey::audit_logs(report_id.trim())).await;
        QueryState {
            status: raw.status,
            data: raw.data.as_deref().map(normalize_entries),
            error: raw.error,
            is_stale: raw.is_stale,
        }
    }

    pub async fn is_loaded(&self, report_id: &str) -> bool {
        self.state(report_id).await.status == QueryStatus::Success
    }
}
