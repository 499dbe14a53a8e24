// src/fetcher/http.rs
// =============================================================================
// This module fetches pages over HTTP and hands their raw links back.
//
// Key functionality:
// - One reqwest Client shared by every fetch (connection pooling)
// - Any response with a body is a page, whatever its status: a 404 page is
//   still crawled and its links followed. FetcherConfig::with_fail_on_status
//   turns non-success codes into FetchError::Status instead.
// - The body is parsed by html::extract_raw_links
//
// Configuration lives in FetcherConfig, built with `with_*` methods.
// =============================================================================

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{extract_raw_links, LinkFetcher};
use crate::error::FetchError;

const DEFAULT_REQUEST_TIMEOUT: u64 = 10; // seconds
const DEFAULT_CONNECT_TIMEOUT: u64 = 10; // seconds
const DEFAULT_USER_AGENT: &str = concat!("site-crawler/", env!("CARGO_PKG_VERSION"));

/// HTTP client settings for HttpFetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Whole-request timeout; None lets a request wait forever
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Treat non-2xx responses as failed fetches (off by default)
    pub fail_on_status: bool,
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the whole-request timeout (None disables it)
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_fail_on_status(mut self, fail: bool) -> Self {
        self.fail_on_status = fail;
        self
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT)),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fail_on_status: false,
        }
    }
}

/// Fetches pages with reqwest and extracts their anchor hrefs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    fail_on_status: bool,
}

impl HttpFetcher {
    /// Builds a fetcher with the default configuration
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(&FetcherConfig::default())
    }

    pub fn with_config(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            fail_on_status: config.fail_on_status,
        })
    }

    // Fetches a web page and returns its HTML content
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            if self.fail_on_status {
                return Err(FetchError::Status(status.as_u16()));
            }
            debug!(url, status = status.as_u16(), "Non-success status, parsing body anyway");
        }

        Ok(response.text().await?)
    }
}

impl LinkFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let body = self.fetch_body(url).await?;
        let links = extract_raw_links(&body);
        debug!(url, links = links.len(), bytes = body.len(), "Fetched page");
        Ok(links)
    }
}
