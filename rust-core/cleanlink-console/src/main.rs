// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! `cleanlink` -- admin console for the CleanLink approval queue.
//!
//! Subcommands:
//! - `pending`: list work awaiting approval
//! - `approve <id>` / `reject <id> --reason <text>`: decide on submitted work
//! - `audit <report-id>`: show the normalized audit history
//! - `whoami`: show how the current token's profile is authorized
//!
//! Connection settings come from flags or `CLEANLINK_API_URL`,
//! `CLEANLINK_TOKEN` and `CLEANLINK_TIMEOUT_SECS`.

mod formatter;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use cleanlink_client::{
    ApprovalWorkflow, AuditLogQuery, ClientConfig, ClientError, CleanLinkClient, Notification,
    NotificationLevel, Notifier, QueryCache,
};
use cleanlink_model::{Report, Session};
use cleanlink_policy::{AdminPolicy, RoleGate};

use formatter::{format_audit, format_pending, format_policy, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "cleanlink", version = VERSION, about = "CleanLink admin console")]
struct Cli {
    /// Base URL of the CleanLink API, path prefix included.
    #[arg(long, env = "CLEANLINK_API_URL", default_value = "http://localhost:3000/api")]
    api_url: String,

    /// Bearer token of the signed-in admin.
    #[arg(long, env = "CLEANLINK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "CLEANLINK_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List work awaiting approval.
    Pending {
        /// Page size.
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Approve the submitted work for a report.
    Approve { id: String },
    /// Reject the submitted work for a report.
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Show a report's audit history.
    Audit { report_id: String },
    /// Show the policy evaluation for the current token.
    Whoami,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Prints notifications to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("{} {}", "OK".green().bold(), notification.message),
            NotificationLevel::Error => {
                eprintln!("{} {}", "Error:".red().bold(), notification.message)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Exit status for a decision. Failures that reached the backend were
/// already printed by [`ConsoleNotifier`]; local rejections were not.
fn decision_exit(result: cleanlink_client::Result<()>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(
            err @ (ClientError::Validation(_)
            | ClientError::MutationInFlight(_)
            | ClientError::Internal(_)),
        ) => Err(err.into()),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

/// Refuse decisions on reports that can no longer change state.
fn ensure_open(report: &Report) -> anyhow::Result<()> {
    if report.status.is_terminal() {
        bail!("report {} is already {}", report.id, report.status);
    }
    Ok(())
}

struct Console {
    config: ClientConfig,
    client: Arc<CleanLinkClient>,
    token: Option<String>,
    cache: Arc<QueryCache>,
    format: OutputFormat,
}

impl Console {
    fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = ClientConfig {
            base_url: cli.api_url.clone(),
            timeout_secs: cli.timeout_secs,
            ..ClientConfig::default()
        };
        let mut client = CleanLinkClient::new(&config).context("invalid connection settings")?;
        if let Some(token) = &cli.token {
            client = client.with_token(token.clone());
        }
        Ok(Self {
            config,
            client: Arc::new(client),
            token: cli.token.clone(),
            cache: Arc::new(QueryCache::new()),
            format: cli.format,
        })
    }

    fn workflow(&self, limit: usize) -> ApprovalWorkflow<CleanLinkClient> {
        ApprovalWorkflow::from_config(
            Arc::clone(&self.client),
            Arc::clone(&self.cache),
            Arc::new(ConsoleNotifier),
            &self.config,
        )
        .with_limit(limit)
    }

    /// Resolve the session behind the configured token.
    async fn session(&self) -> anyhow::Result<Session> {
        let user = self
            .client
            .current_user()
            .await
            .context("could not load the signed-in profile")?;
        Ok(Session::authenticated(user, self.token.clone().unwrap_or_default()))
    }

    /// Load the report and require that the current admin may edit it.
    async fn editable_report(&self, report_id: &str) -> anyhow::Result<Report> {
        let policy = AdminPolicy::evaluate(&self.session().await?);
        if !policy.is_admin().is_authorized() {
            bail!("this account is not an admin ({})", policy.is_admin());
        }
        let report = self
            .client
            .get_report(report_id)
            .await
            .with_context(|| format!("could not load report {report_id}"))?;
        ensure_open(&report)?;
        if !policy.can_edit_report(&report) {
            bail!(
                "report {} is outside your region ({})",
                report.id,
                policy.admin_region().unwrap_or("-")
            );
        }
        Ok(report)
    }

    async fn pending(&self, limit: usize) -> anyhow::Result<ExitCode> {
        let items = self.workflow(limit).pending().await.context("could not load pending approvals")?;
        println!("{}", format_pending(&items, self.format));
        Ok(ExitCode::SUCCESS)
    }

    async fn approve(&self, report_id: &str) -> anyhow::Result<ExitCode> {
        let report = self.editable_report(report_id).await?;
        decision_exit(self.workflow(self.config.pending_limit).approve(&report.id).await)
    }

    async fn reject(&self, report_id: &str, reason: &str) -> anyhow::Result<ExitCode> {
        let report = self.editable_report(report_id).await?;
        decision_exit(self.workflow(self.config.pending_limit).reject(&report.id, reason).await)
    }

    async fn audit(&self, report_id: &str) -> anyhow::Result<ExitCode> {
        let policy = AdminPolicy::evaluate(&self.session().await?);
        let report = self
            .client
            .get_report(report_id)
            .await
            .with_context(|| format!("could not load report {report_id}"))?;

        let query = AuditLogQuery::from_config(Arc::clone(&self.client), Arc::clone(&self.cache), &self.config);
        let entries = query.visible(&policy, &report).await.context("could not load audit history")?;
        if entries.is_empty() && !policy.can_view_audit_log(&report) {
            eprintln!("{} audit history is only visible to admins", "Note:".yellow().bold());
            return Ok(ExitCode::SUCCESS);
        }
        println!("{}", format_audit(&entries, self.format));
        Ok(ExitCode::SUCCESS)
    }

    async fn whoami(&self) -> anyhow::Result<ExitCode> {
        let session = self.session().await?;
        let policy = AdminPolicy::evaluate(&session);
        let scope = RoleGate::super_admin_only().render(
            &session,
            || "all regions".to_string(),
            || match (policy.is_admin().is_authorized(), policy.admin_region()) {
                (false, _) => "none".to_string(),
                (true, Some(region)) => format!("reports in {region}"),
                (true, None) => "all regions (no region assigned)".to_string(),
            },
        );
        let Some(user) = session.resolved_user() else {
            bail!("no user in session");
        };
        println!("{}", format_policy(user, &policy, &scope, self.format));
        Ok(ExitCode::SUCCESS)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let console = Console::from_cli(&cli)?;
    tracing::debug!(api_url = %cli.api_url, format = %cli.format, "console started");

    match &cli.command {
        Command::Pending { limit } => console.pending(*limit).await,
        Command::Approve { id } => console.approve(id).await,
        Command::Reject { id, reason } => console.reject(id, reason).await,
        Command::Audit { report_id } => console.audit(report_id).await,
        Command::Whoami => console.whoami().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_reject_requires_reason() {
        assert!(Cli::try_parse_from(["cleanlink", "reject", "12"]).is_err());
        let cli = Cli::try_parse_from(["cleanlink", "reject", "12", "--reason", "Blurry photo"]).unwrap();
        match cli.command {
            Command::Reject { id, reason } => {
                assert_eq!(id, "12");
                assert_eq!(reason, "Blurry photo");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_decision_exit() {
        let code = |r| format!("{:?}", decision_exit(r).unwrap());
        assert_eq!(code(Ok(())), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(
            code(Err(ClientError::from_status(500, None))),
            format!("{:?}", ExitCode::FAILURE)
        );
        assert!(decision_exit(Err(ClientError::Validation("empty".into()))).is_err());
    }

    #[test]
    fn test_terminal_reports_are_not_decided() {
        let open = Report::new("12", Some("Downtown"), cleanlink_model::ReportStatus::PendingApproval);
        assert!(ensure_open(&open).is_ok());

        let resolved = Report::new("13", Some("Downtown"), cleanlink_model::ReportStatus::Resolved);
        let err = ensure_open(&resolved).unwrap_err();
        assert_eq!(err.to_string(), "report 13 is already resolved");
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "cleanlink",
            "--api-url",
            "https://city.example/api",
            "--format",
            "json",
            "pending",
            "--limit",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "https://city.example/api");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Pending { limit: 10 }));
    }
}
