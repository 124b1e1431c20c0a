// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! Output formatters for console results.
//!
//! Supports two output modes:
//! - **Table**: Human-readable columnar output using `comfy-table`.
//! - **JSON**: Pretty-printed JSON of the same records.

use std::fmt;

use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;

use cleanlink_audit::AuditEntry;
use cleanlink_model::{PendingApproval, User};
use cleanlink_policy::AdminPolicy;

/// Longest cell text before truncation.
const MAX_CELL: usize = 48;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown format '{other}'. Valid formats: table, json")),
        }
    }
}

/// Pretty-print any serializable value with 2-space indentation.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.iter().map(|h| Cell::new(h)));
    table
}

fn row_footer(table: Table, row_count: usize) -> String {
    format!("{table}\n({row_count} row{})", if row_count == 1 { "" } else { "s" })
}

/// Shorten long free text so one note cannot blow up the table.
fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_CELL - 3).collect();
        format!("{head}...")
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => truncate(v),
        _ => "-".to_string(),
    }
}

pub fn format_pending(items: &[PendingApproval], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(items);
    }
    if items.is_empty() {
        return "No work awaiting approval.".to_string();
    }

    let mut table = new_table(&["ID", "Title", "Region", "Submitted by", "Submitted at", "Photo"]);
    for item in items {
        let report = &item.report;
        table.add_row(vec![
            Cell::new(&report.id),
            Cell::new(or_dash(report.title.as_deref())),
            Cell::new(or_dash(report.region.as_deref())),
            Cell::new(or_dash(item.submitted_by.as_deref())),
            Cell::new(
                item.submitted_at
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
            Cell::new(if item.cleaned_image_url.is_some() { "yes" } else { "no" }),
        ]);
    }
    row_footer(table, items.len())
}

pub fn format_audit(entries: &[AuditEntry], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(entries);
    }
    if entries.is_empty() {
        return "No audit history.".to_string();
    }

    let mut table = new_table(&["When", "Action", "Actor", "Role", "Details", "Changes"]);
    for entry in entries {
        let when = entry
            .parsed_timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| or_dash(Some(&entry.timestamp)));
        let changes = entry
            .changes
            .iter()
            .map(|(field, change)| format!("{field}: {} -> {}", change.before, change.after))
            .collect::<Vec<_>>()
            .join("\n");

        table.add_row(vec![
            Cell::new(when),
            Cell::new(entry.action_type.as_str()),
            Cell::new(&entry.actor),
            Cell::new(&entry.actor_role),
            Cell::new(or_dash(Some(&entry.details))),
            Cell::new(if changes.is_empty() { "-".to_string() } else { changes }),
        ]);
    }
    row_footer(table, entries.len())
}

/// Render the policy evaluation for `user` as a Field | Value table.
pub fn format_policy(user: &User, policy: &AdminPolicy, scope: &str, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(&serde_json::json!({
            "user": user,
            "isAdmin": policy.is_admin().as_option(),
            "isSuperAdmin": policy.is_super_admin(),
            "adminRegion": policy.admin_region(),
            "scope": scope,
        }));
    }

    let mut permissions: Vec<&str> = user.permissions.iter().map(String::as_str).collect();
    permissions.sort_unstable();

    let mut table = new_table(&["Field", "Value"]);
    let rows = [
        ("User", user.display_name().to_string()),
        ("Role", user.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into())),
        ("Permissions", if permissions.is_empty() { "-".into() } else { permissions.join(", ") }),
        ("Admin", policy.is_admin().to_string()),
        ("Super admin", policy.is_super_admin().to_string()),
        ("Region", or_dash(policy.admin_region())),
        ("Scope", scope.to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table.to_string()
}
