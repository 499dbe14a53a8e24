// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling: every newly found page is fetched in its own task
// - Same-host restriction (never leaves the seed's host)
// - Each page is fetched at most once, even with cycles
// - Results stream out while the crawl is still running
//
// Submodules:
// - orchestrator: the control loop, dispatch and completion detection
// - normalize: turns raw hrefs into same-host absolute URLs
// - page: the Page record and the PageStream it arrives on
// =============================================================================

mod normalize;
mod orchestrator;
mod page;

pub use normalize::normalize_links;
pub use orchestrator::{crawl, Crawler, DEFAULT_OUTPUT_BUFFER, RESULTS_BUFFER};
pub use page::{Page, PageStream};
