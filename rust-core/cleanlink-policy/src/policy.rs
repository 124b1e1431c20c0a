// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
//! Admin policy evaluation.
//!
//! [`AdminPolicy::evaluate`] takes a session snapshot and answers the four
//! questions admin views ask:
//!
//! - **Is this user an admin?** Tri-state: unknown while the session is still
//!   resolving or nobody is signed in, otherwise authorized or denied.
//! - **Is this user a super admin?**
//! - **Which region is the admin assigned to?**
//! - **May the admin edit / audit this report?**
//!
//! The policy is a value. Re-evaluate it whenever the session changes.

use std::fmt;

use cleanlink_model::{Report, Role, Session, ADMIN_ACCESS_PERMISSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// AdminStatus
// ---------------------------------------------------------------------------

/// Outcome of the admin check.
///
/// `Unknown` is distinct from `Denied`: a view may show a spinner for the
/// former and an access-denied notice for the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    /// Session still bootstrapping, or no user present.
    Unknown,
    Authorized,
    Denied,
}

impl AdminStatus {
    /// Collapse to a boolean. `Unknown` denies.
    pub fn is_authorized(self) -> bool {
        self == AdminStatus::Authorized
    }

    /// `None` for unknown, `Some(bool)` once known.
    pub fn as_option(self) -> Option<bool> {
        match self {
            AdminStatus::Unknown => None,
            AdminStatus::Authorized => Some(true),
            AdminStatus::Denied => Some(false),
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminStatus::Unknown => write!(f, "UNKNOWN"),
            AdminStatus::Authorized => write!(f, "AUTHORIZED"),
            AdminStatus::Denied => write!(f, "DENIED"),
        }
    }
}

// ---------------------------------------------------------------------------
// AdminPolicy
// ---------------------------------------------------------------------------

/// Policy snapshot derived from one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPolicy {
    status: AdminStatus,
    super_admin: bool,
    region: Option<String>,
}

impl AdminPolicy {
    /// Derive the policy for `session`. No I/O.
    pub fn evaluate(session: &Session) -> Self {
        let Some(user) = session.resolved_user() else {
            // Admin status waits for bootstrap; role and region are read
            // from whatever user is already attached.
            let user = session.user.as_ref();
            return Self {
                status: AdminStatus::Unknown,
                super_admin: user.is_some_and(|u| u.role == Some(Role::SuperAdmin)),
                region: user.and_then(|u| u.region.clone()),
            };
        };

        let role_grants = user.role.is_some_and(Role::is_admin_role);
        let status = if role_grants || user.has_permission(ADMIN_ACCESS_PERMISSION) {
            AdminStatus::Authorized
        } else {
            AdminStatus::Denied
        };

        Self {
            status,
            super_admin: user.role == Some(Role::SuperAdmin),
            region: user.region.clone(),
        }
    }

    pub fn is_admin(&self) -> AdminStatus {
        self.status
    }

    pub fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    /// Assigned locality, or `None` when the user has none.
    pub fn admin_region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Whether the admin may edit `report`.
    ///
    /// Super admins may edit anything. Other admins are restricted to reports
    /// whose region overlaps theirs (see [`regions_overlap`]); when either
    /// region is missing no restriction applies.
    pub fn can_edit_report(&self, report: &Report) -> bool {
        let allowed = if !self.status.is_authorized() {
            false
        } else if self.super_admin {
            true
        } else {
            match (self.region.as_deref(), report.region.as_deref()) {
                (Some(admin), Some(target)) => regions_overlap(admin, target),
                _ => true,
            }
        };

        debug!(
            report_id = %report.id,
            status = %self.status,
            super_admin = self.super_admin,
            allowed,
            "edit decision"
        );
        allowed
    }

    /// Whether the admin may read the audit log of `report`.
    pub fn can_view_audit_log(&self, report: &Report) -> bool {
        let allowed = self.status.is_authorized();
        debug!(report_id = %report.id, status = %self.status, allowed, "audit log decision");
        allowed
    }
}

/// Case-insensitive containment in either direction.
///
/// "Springfield" overlaps "Springfield Metro Area" and vice versa. Note this
/// also matches "North Springfield" against "Springfield"; regions are free
/// text, so there is no hierarchy to consult instead.
pub fn regions_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}
