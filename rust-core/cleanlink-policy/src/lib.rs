// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
//! Role-based access control for CleanLink admin surfaces.
//!
//! Two pieces, both pure and synchronous:
//!
//! - [`policy`]: derives admin status, super-admin status, the admin's region
//!   and per-report edit/audit permissions from a [`Session`](cleanlink_model::Session).
//! - [`gate`]: a conditional-render primitive keyed on the session's role.
//!
//! Denial is never an error here. Callers get a boolean or an
//! [`AdminStatus`] and render fallback content.

pub mod gate;
pub mod policy;

pub use gate::RoleGate;
pub use policy::{regions_overlap, AdminPolicy, AdminStatus};
