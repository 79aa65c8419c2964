//! HTTP fetch pipeline for extraction targets.
//!
//! ### URL Normalization
//! - Collapse `http:`/`https:` slash runs to `//`
//! - Default scheme `https://` when the input does not start with `http`
//!
//! ### Fetch Semantics
//! - Exactly one GET per call, no custom headers.
//! - Redirects and timeouts are whatever the HTTP client does natively,
//!   unless a timeout is configured.
//! - Only `200 OK` is a success; every other status is an error.

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub use url::normalize;

use sieve_core::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Request timeout (default: none, the client's own behavior applies)
    pub timeout: Option<Duration>,
}

impl From<&sieve_core::AppConfig> for FetchConfig {
    fn from(config: &sieve_core::AppConfig) -> Self {
        Self { timeout: config.timeout() }
    }
}

/// Source of page bodies.
///
/// This allows swapping the transport (or stubbing it in tests) without
/// changing the request handler.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, Error>;
}

/// reqwest-backed page fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder().use_rustls_tls().gzip(true).brotli(true).deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        tracing::info!(url, "loading site");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Parse(format!("failed to read response body: {e}")))?;

        tracing::debug!(url, bytes = body.len(), "fetched page");

        Ok(body)
    }
}
