// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Report and profile endpoints.

use tracing::{info, warn};

use cleanlink_model::{Report, ReportDraft, User};

use crate::client::CleanLinkClient;
use crate::error::{ClientError, Result};
use crate::types::Envelope;

impl CleanLinkClient {
    /// Fetch a single report by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no report has the given id.
    pub async fn get_report(&self, report_id: &str) -> Result<Report> {
        let report_id = report_id.trim();
        if report_id.is_empty() {
            return Err(ClientError::Validation("report id must not be empty".into()));
        }
        let url = self.endpoint(&["reports", report_id])?;
        let body: Envelope<Report> = self.get(url).await?;
        Ok(body.into_inner())
    }

    /// Submit a new report.
    ///
    /// The draft is validated first; an invalid draft fails with
    /// [`ClientError::InvalidDraft`] and no request is sent.
    pub async fn submit_report(&self, draft: &ReportDraft) -> Result<Report> {
        if let Err(errors) = draft.validate() {
            warn!(fields = errors.len(), "report draft failed validation");
            return Err(errors.into());
        }
        let url = self.endpoint(&["reports"])?;
        let body: Envelope<Report> = self.post(url, draft).await?;
        let report = body.into_inner();
        info!(report_id = %report.id, "report submitted");
        Ok(report)
    }

    /// The profile behind the current bearer token (`GET /me`).
    pub async fn current_user(&self) -> Result<User> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthorized(Some("no session token".into())));
        }
        let url = self.endpoint(&["me"])?;
        let body: Envelope<User> = self.get(url).await?;
        Ok(body.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    // Nothing listens on port 9; any request that got past validation would
    // fail with a network error instead.
    fn offline_client() -> CleanLinkClient {
        CleanLinkClient::new(&ClientConfig::default().with_base_url("http://127.0.0.1:9/api"))
            .unwrap()
            .with_token("t")
    }

    #[tokio::test]
    async fn test_invalid_draft_never_sent() {
        let draft = ReportDraft {
            title: "Hi".into(),
            description: "short".into(),
            category: "volcano".into(),
            region: " ".into(),
            ..Default::default()
        };
        match offline_client().submit_report(&draft).await {
            Err(ClientError::InvalidDraft(errors)) => {
                assert!(errors.for_field("title").is_some());
                assert!(errors.for_field("category").is_some());
                assert!(errors.for_field("region").is_some());
            }
            other => panic!("expected InvalidDraft, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_report_id() {
        assert!(matches!(
            offline_client().get_report("").await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_requires_token() {
        let client = CleanLinkClient::new(&ClientConfig::default()).unwrap();
        assert!(matches!(
            client.current_user().await,
            Err(ClientError::Unauthorized(_))
        ));
    }
}
