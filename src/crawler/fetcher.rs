//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured client identity
//! - GET requests with a bounded timeout
//! - A redirect policy that never leaves the requested origin
//! - Error classification
//!
//! Fetches are never retried here; the caller decides what a failure means.

use crate::config::Config;
use crate::url::{normalize_url, Origin};
use crate::FetchError;
use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// Single-request HTTP fetcher
///
/// Cloning is cheap: the underlying client is reference-counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Address the body was served from, after same-origin redirects
    pub url: Url,

    /// Response body text
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client("Mozilla/5.0 (compatible; Harvester)").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(same_origin_redirects())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Follows up to `MAX_REDIRECTS` hops as long as they stay on the origin of
/// the original request. A cross-origin hop stops the chain and the 3xx
/// response is returned as-is.
fn same_origin_redirects() -> redirect::Policy {
    redirect::Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let allowed = attempt
            .previous()
            .first()
            .and_then(Origin::of)
            .map_or(false, |origin| origin.contains(attempt.url()));

        if allowed {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

impl Fetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent.value)?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(config.crawler.request_timeout_ms),
        ))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Default timeout applied by `fetch`
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `url` with the default timeout
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetch_with_timeout(url, self.timeout).await
    }

    /// Fetches `url` and returns the body with its final address
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Non-2xx status | `HttpStatus(status)` |
    /// | Timeout (request or body) | `Timeout` |
    /// | Connection refused, DNS, TLS | `Connection` |
    /// | Anything else | `Unexpected` |
    pub async fn fetch_with_timeout(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = normalize_url(response.url().as_str()).unwrap_or_else(|_| url.clone());
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connection {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Unexpected {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
