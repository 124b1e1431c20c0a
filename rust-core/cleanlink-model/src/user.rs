// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Users and roles as served by the identity provider.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::string_or_number;

/// Capability string that grants admin status independently of the role.
pub const ADMIN_ACCESS_PERMISSION: &str = "admin:access";

/// Role-based access level.
///
/// The wire form is a lowercase string. `field_admin` is accepted as an alias
/// for [`Role::Admin`]; any string outside the closed set becomes
/// [`Role::Unknown`], which no gate ever allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Citizen filing reports.
    User,
    /// Field administrator, usually scoped to a region.
    #[serde(alias = "field_admin")]
    Admin,
    /// Administrator with unrestricted scope.
    SuperAdmin,
    /// A role string this client does not understand.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Unknown => "unknown",
        }
    }

    /// Whether this role carries administrative rights on its own.
    pub fn is_admin_role(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Absent for accounts that have not finished onboarding.
    #[serde(default)]
    pub role: Option<Role>,
    /// Free-text locality the admin is assigned to.
    #[serde(default)]
    pub region: Option<String>,
    /// Capability strings such as [`ADMIN_ACCESS_PERMISSION`].
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl User {
    /// Create a user with the given id and role and no other attributes.
    pub fn new(id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            username: None,
            email: None,
            role,
            region: None,
            permissions: HashSet::new(),
        }
    }

    /// Builder-style setter for the assigned region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder-style setter adding a capability string.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Name to show in the UI: username, then email, then the id.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.id)
    }
}
