// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are only two ways things go wrong that a caller ever sees:
// - CrawlError: the crawl could not start at all (bad seed URL, no client)
// - FetchError: a single page could not be fetched
//
// FetchError never reaches the caller of crawl(): the orchestrator logs it
// and treats the page as having no links. It is public because custom
// LinkFetcher implementations need to return it.
// =============================================================================

use thiserror::Error;

/// Errors returned synchronously when a crawl cannot be started.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL could not be parsed
    #[error("invalid url for crawling '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The default HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors from fetching a single page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed (DNS, connection, TLS, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status code
    #[error("HTTP {0}")]
    Status(u16),

    /// A StaticFetcher was asked for a URL it has no entry for
    #[error("unknown URL: {0}")]
    UnknownUrl(String),
}
