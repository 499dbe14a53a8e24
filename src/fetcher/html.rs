// src/fetcher/html.rs
// =============================================================================
// This module pulls raw href values out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses
//
// Unlike a link checker, the crawler wants the hrefs *exactly* as written:
// no resolving, no filtering, duplicates kept. The normalizer in
// crawl/normalize.rs decides what a link means relative to its page.
// =============================================================================

use std::sync::OnceLock;

use scraper::{Html, Selector};
use tracing::{debug, error};

// The selector is a constant, so we parse it once and share it
fn anchor_selector() -> Option<&'static Selector> {
    static SELECTOR: OnceLock<Option<Selector>> = OnceLock::new();
    SELECTOR
        .get_or_init(|| match Selector::parse("a") {
            Ok(selector) => Some(selector),
            Err(e) => {
                error!(error = %e, "Failed to build anchor selector");
                None
            }
        })
        .as_ref()
}

// Extracts the href of every <a> element, in document order
//
// Parameters:
//   html: the HTML content to parse
//
// Returns: Vec<String> of href values as written in the page
//
// Anchors with no href, or an empty one, are skipped.
//
// Example:
//   html = "<a href='/docs'>Docs</a><a>no link</a><a href='/docs'>again</a>"
//   result = ["/docs", "/docs"]
pub fn extract_raw_links(html: &str) -> Vec<String> {
    let Some(selector) = anchor_selector() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    let mut links = Vec::new();
    for element in document.select(selector) {
        match element.value().attr("href") {
            Some(href) if !href.is_empty() => links.push(href.to_string()),
            _ => debug!(anchor = %element.html(), "Anchor without href"),
        }
    }

    links
}
