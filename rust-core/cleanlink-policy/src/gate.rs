// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
//! Declarative role gate.
//!
//! A [`RoleGate`] holds a fixed set of allowed roles and picks between two
//! render branches. A missing role (signed out, or session still loading) is
//! handled exactly like a role outside the set: the fallback renders.

use cleanlink_model::{Role, Session};
use tracing::debug;

/// Conditional-render primitive keyed on the session's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    allowed: Vec<Role>,
}

impl RoleGate {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn super_admin_only() -> Self {
        Self::new([Role::SuperAdmin])
    }

    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    pub fn admin_or_super_admin() -> Self {
        Self::new([Role::Admin, Role::SuperAdmin])
    }

    pub fn user_only() -> Self {
        Self::new([Role::User])
    }

    pub fn allowed_roles(&self) -> &[Role] {
        &self.allowed
    }

    /// Whether the session's role is in the allowed set.
    pub fn permits(&self, session: &Session) -> bool {
        let role = session.current_role();
        let permitted = role.is_some_and(|r| r != Role::Unknown && self.allowed.contains(&r));
        debug!(?role, allowed = ?self.allowed, permitted, "role gate");
        permitted
    }

    /// Render `allowed` when permitted, otherwise `fallback`.
    pub fn render<T>(
        &self,
        session: &Session,
        allowed: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> T {
        if self.permits(session) {
            allowed()
        } else {
            fallback()
        }
    }

    /// Like [`RoleGate::render`] with an empty fallback.
    pub fn render_or_default<T: Default>(&self, session: &Session, allowed: impl FnOnce() -> T) -> T {
        self.render(session, allowed, T::default)
    }
}
