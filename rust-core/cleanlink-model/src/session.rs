// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Session snapshot handed to policy and gate checks.
//!
//! The identity provider owns the session; this crate only models what it
//! exposes. A [`Session`] is passed by reference into every check rather
//! than reached for through a global, so tests build one directly.

use serde::{Deserialize, Serialize};

use crate::user::{Role, User};

/// Bootstrap lifecycle of the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    /// Nothing has been attempted yet.
    #[default]
    Uninitialized,
    /// A stored token is being exchanged for a user profile.
    Loading,
    /// The provider has settled; `user` is authoritative (possibly `None`).
    Ready,
}

/// Current identity: `{ user, token, isAuthenticated, isBootstrapping }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    /// Bearer token for the REST backend.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub state: BootstrapState,
}

impl Session {
    /// A session whose provider is still resolving the stored credentials.
    pub fn loading() -> Self {
        Self {
            user: None,
            token: None,
            state: BootstrapState::Loading,
        }
    }

    /// A settled session with nobody signed in.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            token: None,
            state: BootstrapState::Ready,
        }
    }

    /// A settled session for `user` authenticated with `token`.
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            state: BootstrapState::Ready,
        }
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.state != BootstrapState::Ready
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_bootstrapping() && self.user.is_some() && self.token.is_some()
    }

    /// The user, but only once the provider has settled.
    pub fn resolved_user(&self) -> Option<&User> {
        if self.is_bootstrapping() {
            None
        } else {
            self.user.as_ref()
        }
    }

    /// Role of the resolved user. `None` while loading, signed out, or when
    /// the profile carries no role.
    pub fn current_role(&self) -> Option<Role> {
        self.resolved_user().and_then(|user| user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_session_hides_user() {
        let mut session = Session::loading();
        session.user = Some(User::new("u1", Some(Role::Admin)));
        assert!(session.is_bootstrapping());
        assert!(!session.is_authenticated());
        assert!(session.resolved_user().is_none());
        assert!(session.current_role().is_none());
    }

    #[test]
    fn test_authenticated_session() {
        let session = Session::authenticated(User::new("u1", Some(Role::SuperAdmin)), "tok");
        assert!(!session.is_bootstrapping());
        assert!(session.is_authenticated());
        assert_eq!(session.current_role(), Some(Role::SuperAdmin));
    }

    #[test]
    fn test_default_session_is_uninitialized() {
        let session = Session::default();
        assert_eq!(session.state, BootstrapState::Uninitialized);
        assert!(session.is_bootstrapping());
        assert!(!Session::anonymous().is_authenticated());
    }

    #[test]
    fn test_token_is_never_serialized() {
        let session = Session::authenticated(User::new("u1", None), "secret");
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret"));
    }
}
