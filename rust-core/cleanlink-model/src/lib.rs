// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! CleanLink Model
//!
//! Data types shared by the policy, audit and client crates. Nothing in
//! here performs I/O; every type mirrors a JSON shape served by the CleanLink
//! REST backend or held by the identity provider.
//!
//! # Modules
//!
//! - [`user`] -- `Role`, `User` and capability strings.
//! - [`session`] -- The session snapshot with its bootstrap lifecycle.
//! - [`report`] -- `Report`, `ReportStatus` and `PendingApproval`.
//! - [`draft`] -- `ReportDraft` and its field-level validation.
//! - [`error`] -- `FieldError` / `ValidationErrors`.

pub mod draft;
pub mod error;
pub mod id;
pub mod report;
pub mod session;
pub mod user;

pub use draft::{ReportCategory, ReportDraft};
pub use error::{FieldError, ValidationErrors};
pub use report::{PendingApproval, Report, ReportStatus};
pub use session::{BootstrapState, Session};
pub use user::{Role, User, ADMIN_ACCESS_PERMISSION};
