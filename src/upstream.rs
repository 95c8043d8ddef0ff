//! Scoring API Client
//!
//! HTTP client for the upstream scoring service. Every call is a `GET`
//! returning JSON; a transport error or 5xx is retried a bounded number of
//! times, anything else is reported to the caller as-is.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::config::Config;

/// Upstream call failure
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl UpstreamError {
    fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::ServerError(code) => *code >= 500,
            Self::ParseError(_) => false,
        }
    }
}

/// Scoring API client
#[derive(Debug, Clone)]
pub struct ScoringClient {
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
    http_client: reqwest::Client,
}

impl ScoringClient {
    /// Create new client from application config
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| UpstreamError::NetworkError(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url.clone(),
            max_retries: config.upstream_max_retries,
            retry_backoff: Duration::from_millis(config.upstream_retry_backoff_ms),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /clients`
    pub async fn list_clients(&self) -> Result<Value, UpstreamError> {
        self.get_json("/clients").await
    }

    /// `GET /client/{id}`
    pub async fn client(&self, client_id: u64) -> Result<Value, UpstreamError> {
        self.get_json(&format!("/client/{}", client_id)).await
    }

    /// `GET /analyze/{id}`
    pub async fn analyze(&self, client_id: u64) -> Result<Value, UpstreamError> {
        self.get_json(&format!("/analyze/{}", client_id)).await
    }

    async fn get_json(&self, path: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            match self.get_once(&url).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Upstream call {} failed ({}), retry {}/{}",
                        path, e, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                result => return result,
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<Value, UpstreamError> {
        tracing::debug!("GET {}", url);

        let response = self.http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::NetworkError(e.to_string()))?;

        // Only a plain 200 counts as success
        if response.status() == StatusCode::OK {
            response.json().await
                .map_err(|e| UpstreamError::ParseError(e.to_string()))
        } else {
            Err(UpstreamError::ServerError(response.status().as_u16()))
        }
    }
}
