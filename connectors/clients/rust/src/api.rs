// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Backend seams.
//!
//! The workflow controllers are generic over these traits so tests (and
//! alternative transports) can stand in for [`CleanLinkClient`](crate::client::CleanLinkClient).

use async_trait::async_trait;

use cleanlink_audit::RawAuditEntry;
use cleanlink_model::PendingApproval;

use crate::error::Result;

/// Pending-approval queue and the two decisions on it.
#[async_trait]
pub trait ApprovalsApi: Send + Sync + 'static {
    /// `GET /pending-approvals?limit=N`
    async fn list_pending_approvals(&self, limit: usize) -> Result<Vec<PendingApproval>>;

    /// `POST /reports/{id}/approve`
    async fn approve_report(&self, report_id: &str) -> Result<()>;

    /// `POST /reports/{id}/reject` with `{ "reason": ... }`
    async fn reject_report(&self, report_id: &str, reason: &str) -> Result<()>;
}

#[async_trait]
pub trait AuditLogApi: Send + Sync + 'static {
    /// `GET /reports/{id}/audit-logs`, entries exactly as served.
    async fn list_audit_logs(&self, report_id: &str) -> Result<Vec<RawAuditEntry>>;
}
