// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! CleanLink client configuration, authentication, and HTTP transport layer.
//!
//! [`CleanLinkClient`] owns the base URL, HTTP client, bearer token and
//! timeout. Endpoint methods (approvals, audit logs, reports) are defined as
//! `impl CleanLinkClient` blocks in their respective modules.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use cleanlink_model::Session;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::ErrorEnvelope;

// ---------------------------------------------------------------------------
// CleanLinkClient
// ---------------------------------------------------------------------------

/// HTTP client for the CleanLink REST API.
///
/// # Examples
///
/// ```rust,no_run
/// use cleanlink_client::client::CleanLinkClient;
/// use cleanlink_client::config::ClientConfig;
///
/// # #[tokio::main]
/// # async fn main() -> cleanlink_client::error::Result<()> {
/// let client = CleanLinkClient::new(&ClientConfig::default())?.with_token("jwt");
/// let report = client.get_report("42").await?;
/// println!("{:?}", report.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CleanLinkClient {
    /// Base URL with any path prefix (e.g. `https://city.example/api`).
    base_url: Url,
    /// Underlying `reqwest` HTTP client (connection-pooled, TLS-capable).
    http: reqwest::Client,
    /// Bearer token taken from the session.
    token: Option<String>,
    timeout: Duration,
}

impl CleanLinkClient {
    // -- Constructors -------------------------------------------------------

    /// Create an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the configuration is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Validation(format!("Invalid base URL: {e}")))?;
        let timeout = config.timeout();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            base_url,
            http,
            token: None,
            timeout,
        })
    }

    /// Create a client carrying the session's bearer token, if any.
    pub fn for_session(config: &ClientConfig, session: &Session) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.token = session.token.clone();
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // -- Internal HTTP helpers ----------------------------------------------

    /// Build an endpoint URL by appending percent-encoded path segments to
    /// the base URL, keeping any path prefix the base URL has.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Validation(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ClientError::Network(err)
        }
    }

    /// Perform a GET request and deserialize the JSON response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Perform a POST request with a JSON body and deserialize the response.
    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        debug!(%url, "POST");
        let response = self
            .apply_auth(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Perform a POST whose success body is irrelevant.
    pub(crate) async fn post_command<B: Serialize>(&self, url: Url, body: Option<&B>) -> Result<()> {
        debug!(%url, "POST");
        let mut request = self.apply_auth(self.http.post(url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    // -- Response handling --------------------------------------------------

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            serde_json::from_str(&body).map_err(ClientError::Serialization)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Turn a non-2xx response into the appropriate [`ClientError`] variant.
    async fn extract_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.message().map(str::to_owned),
            Err(_) => None,
        };

        ClientError::from_status(status, message)
    }
}
