// src/fetcher/mod.rs
// =============================================================================
// This module defines how the crawler gets the raw links out of a page.
//
// The orchestrator only ever asks one question of the outside world:
// "given this URL, which hrefs are on the page?" That question is the
// LinkFetcher trait. Two answers ship with the crate:
// - HttpFetcher: real network fetch + HTML parsing (http.rs, html.rs)
// - StaticFetcher: a fixed URL -> links map, for tests and offline use
//
// Submodules:
// - http: reqwest client and FetcherConfig
// - html: extracts href values from an HTML document
// =============================================================================

mod html;
mod http;

use std::collections::HashMap;
use std::future::Future;

use crate::error::FetchError;

pub use html::extract_raw_links;
pub use http::{FetcherConfig, HttpFetcher};

/// Something that can turn a URL into the raw href strings found on that page.
///
/// Links are returned as found: document order, duplicates included,
/// relative or malformed values untouched. Normalization happens later.
pub trait LinkFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<String>, FetchError>> + Send;
}

/// A fetcher backed by a fixed map of URL -> links.
///
/// URLs missing from the map fail with FetchError::UnknownUrl, which makes
/// it easy to simulate unreachable pages.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the links returned for `url`, replacing any previous entry
    pub fn with_page<I, S>(mut self, url: impl Into<String>, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pages
            .insert(url.into(), links.into_iter().map(Into::into).collect());
        self
    }
}

impl<K, V, S> FromIterator<(K, V)> for StaticFetcher
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |fetcher, (url, links)| fetcher.with_page(url, links))
    }
}

impl LinkFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::UnknownUrl(url.to_string()))
    }
}
