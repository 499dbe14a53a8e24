// src/crawl/page.rs
// =============================================================================
// The crawl's output types.
//
// - Page: one fetched page and the same-host links found on it
// - PageStream: the receiving end of a crawl, usable as a futures::Stream
//
// A PageStream ends (yields None) exactly once the crawl is finished.
// =============================================================================

use std::collections::BTreeSet;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

/// A crawled page and its normalized, deduplicated same-host links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub url: String,
    pub links: BTreeSet<String>,
}

/// Pages produced by a running crawl, in the order they were processed.
///
/// The stream must be drained: the crawl only makes progress while the
/// consumer keeps up. Dropping it stops the crawl from emitting more pages.
#[derive(Debug)]
pub struct PageStream {
    rx: mpsc::Receiver<Page>,
}

impl PageStream {
    pub(crate) fn new(rx: mpsc::Receiver<Page>) -> Self {
        Self { rx }
    }

    /// Waits for the next page; None means the crawl is over
    pub async fn next_page(&mut self) -> Option<Page> {
        self.rx.recv().await
    }

    /// Drains the whole crawl into a Vec
    pub async fn collect_pages(mut self) -> Vec<Page> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page);
        }
        pages
    }
}

impl Stream for PageStream {
    type Item = Page;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Page>> {
        self.rx.poll_recv(cx)
    }
}
