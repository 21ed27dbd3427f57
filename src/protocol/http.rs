// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP/JSON backend implementation.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::analytics::SeriesQuery;
use crate::command::CommandEnvelope;
use crate::error::ProtocolError;
use crate::protocol::{Backend, CommandResponse, DispatchMode};

// ============================================================================
// HttpConfig - Configuration for the backend
// ============================================================================

/// Configuration for the HTTP backend.
///
/// # Examples
///
/// ```
/// use iotdash::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("https://api.example.com/")
///     .with_token("eyJhbGciOi...")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://api.example.com");
/// assert!(config.token().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the backend at `base_url`.
    ///
    /// A missing scheme defaults to `http://`. Trailing slashes are removed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{base_url}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bearer token if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url,
            client,
            token: self.token,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the telemetry and command backend.
///
/// # Examples
///
/// ```no_run
/// use iotdash::protocol::{Backend, HttpConfig};
///
/// # async fn example() -> iotdash::Result<()> {
/// let client = HttpConfig::new("https://api.example.com")
///     .with_token("secret")
///     .into_client()?;
/// let record = client.fetch_device("light-12").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(base_url).into_client()
    }

    /// Returns the base URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            return ProtocolError::Timeout(millis);
        }
        ProtocolError::Http(err)
    }

    /// Sends a request and returns the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ProtocolError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProtocolError::AuthenticationFailed);
        }

        if !status.is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(body = %body, "Received HTTP response");

        Ok(body)
    }

    async fn get_json(&self, url: &str) -> Result<Value, ProtocolError> {
        tracing::debug!(url = %url, "Sending HTTP GET");

        let body = self.execute(self.client.get(url)).await?;
        parse_body(&body)
    }
}

fn parse_body(body: &str) -> Result<Value, ProtocolError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| ProtocolError::ConnectionFailed(format!("invalid JSON body: {e}")))
}

impl Backend for HttpClient {
    async fn fetch_device(&self, device_id: &str) -> Result<Value, ProtocolError> {
        let url = self.url(&format!("/device/{}", urlencoding::encode(device_id)));
        self.get_json(&url).await
    }

    async fn send_command(
        &self,
        envelope: &CommandEnvelope,
        mode: DispatchMode,
    ) -> Result<CommandResponse, ProtocolError> {
        let url = self.url(mode.path());

        tracing::debug!(url = %url, topic = %envelope.topic, "Sending device command");

        let body = self.execute(self.client.post(&url).json(envelope)).await?;
        Ok(CommandResponse::new(body))
    }

    async fn fetch_series(&self, query: &SeriesQuery) -> Result<Value, ProtocolError> {
        let path = query.path();
        let url = match query.date() {
            Some(date) => format!("{}?date={}", self.url(&path), date.format("%Y-%m-%d")),
            None => self.url(&path),
        };
        self.get_json(&url).await
    }

    async fn list_devices(&self) -> Result<Value, ProtocolError> {
        let url = self.url("/devices");
        self.get_json(&url).await
    }
}
