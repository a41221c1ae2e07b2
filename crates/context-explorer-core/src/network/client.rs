//! HTTP client shared by the manifest fetcher and the entry enricher.
//!
//! Wraps reqwest with:
//! - A bounded per-request timeout
//! - A fixed user agent
//! - Optional bearer authentication
//! - Transport errors mapped onto [`ExplorerError`]

use crate::config::ExplorerConfig;
use crate::{ExplorerError, Result};
use reqwest::{header, Client, Response};
use std::time::Duration;
use tracing::debug;

/// HTTP client with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client from the explorer configuration.
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        Self::with_timeout(config.request_timeout, &config.user_agent)
    }

    /// Create a client with a custom timeout.
    pub fn with_timeout(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ExplorerError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make a GET request.
    ///
    /// Non-success statuses are returned as-is; only transport failures
    /// become errors.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.send(self.client.get(url), url).await
    }

    /// Make a GET request with `Authorization: Bearer <token>`.
    pub async fn get_with_bearer(&self, url: &str, token: &str) -> Result<Response> {
        let request = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        self.send(request, url).await
    }

    /// Read a response body as text, mapping transport failures.
    pub async fn read_text(&self, response: Response) -> Result<String> {
        response.text().await.map_err(|e| self.map_error(e))
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Response> {
        debug!("GET {} ({})", url, extract_domain(url));
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response)
    }

    fn map_error(&self, err: reqwest::Error) -> ExplorerError {
        if err.is_timeout() {
            ExplorerError::Timeout(self.timeout)
        } else {
            ExplorerError::from(err)
        }
    }
}

/// Extract domain from a URL.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}
