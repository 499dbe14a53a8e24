// src/lib.rs
// =============================================================================
// site-crawler: crawl every page of one host and report the links between
// them.
//
//     let pages = site_crawler::crawl("https://example.com")?;
//     let pages = pages.collect_pages().await;
//
// Modules:
// - crawl: the orchestrator, link normalization and the Page type
// - fetcher: the LinkFetcher trait plus HTTP and static implementations
// - render: list / graph / JSON output for crawled pages
// - logging: builds the tracing Dispatch handed to a Crawler
// - error: CrawlError and FetchError
// =============================================================================

pub mod crawl;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod render;

pub use crawl::{crawl, normalize_links, Crawler, Page, PageStream};
pub use error::{CrawlError, FetchError};
pub use fetcher::{FetcherConfig, HttpFetcher, LinkFetcher, StaticFetcher};
pub use render::{OutputFormat, Renderer};
