//! HTTP client for storefront crawling
//!
//! Wraps `reqwest` behind the [`PageFetcher`] seam and classifies every
//! failure as a [`TransportError`]. No retries are performed.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::infrastructure::scrape_error::TransportError;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Turns a URL into a page body or a classified transport failure
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, TransportError>;
}

/// HTTP client configuration for crawling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        use crate::infrastructure::config::defaults;
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

/// `reqwest`-backed fetcher
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, TransportError> {
        tracing::info!("Fetching URL: {}", url);

        let unreachable = |e: reqwest::Error| TransportError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(unreachable)?;
        let status = response.status();

        if !status.is_success() {
            return Err(classify_status(url, status));
        }

        let body = response.text().await.map_err(unreachable)?;

        tracing::debug!("Successfully fetched: {} ({}, {} chars)", url, status, body.len());
        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify_status(url: &Url, status: StatusCode) -> TransportError {
    TransportError::HttpError {
        url: url.to_string(),
        status: status.as_u16(),
    }
}
