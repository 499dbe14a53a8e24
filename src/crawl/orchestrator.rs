// src/crawl/orchestrator.rs
// =============================================================================
// This module drives a crawl: one control loop, many fetch tasks.
//
// How it works:
// 1. The seed URL is dispatched: marked seen, then fetched in its own task
// 2. Each fetch task normalizes its page's links and reports the page back
//    to the control loop over a channel
// 3. The control loop dispatches every link it has not seen yet, forwards
//    the page to the output stream, then retires the page's unit of work
// 4. When no unit of work is left, the crawl is over and the output closes
//
// Counting pending work:
// - Every unit of work owns a Ticket, which is a clone of the results
//   channel Sender. The control loop itself holds no Sender.
// - The results channel therefore closes exactly when the last Ticket is
//   dropped, and recv() returning None *is* the "pending == 0" signal.
// - A failed fetch drops its Ticket on the spot.
// - A successful fetch sends its Ticket along with the page. The control
//   loop clones it for each child it dispatches, and only then drops it.
//   Children always exist before their parent is retired, so the count
//   cannot touch zero while work is still being added.
//
// The seen set is only ever touched by the control loop, so it needs no lock.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn, Dispatch};
use url::Url;

use super::normalize::normalize_links;
use super::page::{Page, PageStream};
use crate::error::CrawlError;
use crate::fetcher::{HttpFetcher, LinkFetcher};

/// Capacity of the channel fetch tasks report pages through.
pub const RESULTS_BUFFER: usize = 100;
/// Default capacity of the output stream.
pub const DEFAULT_OUTPUT_BUFFER: usize = 100;

/// Crawls a site from `seed` with a default HttpFetcher and no logging.
///
/// Must be called from inside a tokio runtime. Fails immediately if the seed
/// is not a valid URL or the HTTP client cannot be built.
pub fn crawl(seed: &str) -> Result<PageStream, CrawlError> {
    Crawler::new(HttpFetcher::new()?).crawl(seed)
}

/// A reusable crawl configuration: a fetcher, a logger and buffer sizes.
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: Arc<F>,
    logger: Dispatch,
    output_buffer: usize,
}

impl<F: LinkFetcher> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            logger: Dispatch::none(),
            output_buffer: DEFAULT_OUTPUT_BUFFER,
        }
    }

    /// Sends the crawler's log events to `dispatch` instead of discarding them
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.logger = dispatch;
        self
    }

    /// Sets how many pages may wait in the output stream (at least 1)
    pub fn with_output_buffer(mut self, size: usize) -> Self {
        self.output_buffer = size.max(1);
        self
    }

    /// Starts crawling `seed` and returns the stream of crawled pages.
    ///
    /// Only an unparseable seed is reported here. Pages that fail to fetch
    /// are logged and left out of the stream. The stream ends once every
    /// page reachable from the seed has been processed.
    pub fn crawl(&self, seed: &str) -> Result<PageStream, CrawlError> {
        if let Err(source) = Url::parse(seed) {
            return Err(CrawlError::InvalidSeed {
                url: seed.to_string(),
                source,
            });
        }

        let (results_tx, results_rx) = mpsc::channel(RESULTS_BUFFER);
        let (pages_tx, pages_rx) = mpsc::channel(self.output_buffer);

        let control = ControlLoop {
            fetcher: Arc::clone(&self.fetcher),
            logger: self.logger.clone(),
            seen: HashSet::new(),
            results: results_rx,
            pages: pages_tx,
        };
        tokio::spawn(
            control
                .run(seed.to_string(), Ticket(results_tx))
                .with_subscriber(self.logger.clone()),
        );

        Ok(PageStream::new(pages_rx))
    }
}

// One unit of pending work. The results channel stays open while any exist.
#[derive(Clone)]
struct Ticket(mpsc::Sender<Completed>);

impl Ticket {
    // Hands the page to the control loop; the ticket stays alive until the
    // loop has dispatched the page's children
    async fn report(self, page: Page) {
        let tx = self.0.clone();
        if tx.send(Completed { page, ticket: self }).await.is_err() {
            debug!("Control loop is gone, dropping page");
        }
    }
}

struct Completed {
    page: Page,
    ticket: Ticket,
}

struct ControlLoop<F> {
    fetcher: Arc<F>,
    logger: Dispatch,
    seen: HashSet<String>,
    results: mpsc::Receiver<Completed>,
    pages: mpsc::Sender<Page>,
}

impl<F: LinkFetcher> ControlLoop<F> {
    async fn run(mut self, seed: String, ticket: Ticket) {
        info!(seed = %seed, "Starting crawl");
        // The seed owns the only ticket, so the channel cannot close before
        // its fetch has finished
        self.dispatch(seed.clone(), ticket);

        let mut emitted = 0usize;
        while let Some(Completed { page, ticket }) = self.results.recv().await {
            for link in &page.links {
                if !self.seen.contains(link) {
                    self.dispatch(link.clone(), ticket.clone());
                }
            }

            if self.pages.send(page).await.is_err() {
                info!(seed = %seed, "Page stream dropped, abandoning crawl");
                return;
            }
            emitted += 1;

            // Retire this page only after its children hold their own tickets
            drop(ticket);
        }

        info!(
            seed = %seed,
            pages = emitted,
            dispatched = self.seen.len(),
            "Finished crawling"
        );
    }

    // Marks `url` as seen and fetches it in a new task that owns `ticket`
    fn dispatch(&mut self, url: String, ticket: Ticket) {
        self.seen.insert(url.clone());

        let fetcher = Arc::clone(&self.fetcher);
        let task = async move {
            debug!(url = %url, "Fetching page");
            let fetched = fetcher.fetch(&url).await;
            match fetched {
                Ok(raw_links) => {
                    let links = normalize_links(&url, &raw_links);
                    ticket.report(Page { url, links }).await;
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to fetch page");
                    drop(ticket);
                }
            }
        };
        tokio::spawn(task.with_subscriber(self.logger.clone()));
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why count work with channel Senders instead of a counter?
//    - An mpsc channel closes when its last Sender is dropped
//    - So "number of live Senders" is a counter that tokio maintains for us,
//      and recv() returning None is the "counter hit zero" wake-up
//    - Dropping happens automatically on every path, including panics in a
//      fetch task, so a unit of work can never be forgotten
//
// 2. Why does the control loop not keep a Sender?
//    - If it did, the channel would never close and the crawl would hang
//
// 3. What does with_subscriber do?
//    - It runs a future with a specific tracing Dispatch as its logger
//    - tokio::spawn does not carry the caller's logger over to the new task,
//      so every spawned task is wrapped explicitly
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetcher::StaticFetcher;
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::sync::Mutex;
    use std::time::Duration;

    // Crawls to completion, failing the test instead of hanging forever
    async fn crawl_all<F: LinkFetcher>(crawler: &Crawler<F>, seed: &str) -> Vec<Page> {
        let pages = crawler.crawl(seed).expect("seed accepted");
        tokio::time::timeout(Duration::from_secs(5), pages.collect_pages())
            .await
            .expect("crawl finished")
    }

    fn by_url(pages: Vec<Page>) -> BTreeMap<String, Vec<String>> {
        pages
            .into_iter()
            .map(|page| (page.url, page.links.into_iter().collect()))
            .collect()
    }

    fn expected(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(url, links)| {
                let links: BTreeSet<String> = links.iter().map(|l| l.to_string()).collect();
                (url.to_string(), links.into_iter().collect())
            })
            .collect()
    }

    // Wraps a StaticFetcher and counts how often each URL is fetched
    #[derive(Default)]
    struct CountingFetcher {
        inner: StaticFetcher,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl CountingFetcher {
        fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    impl LinkFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            tokio::task::yield_now().await;
            self.inner.fetch(url).await
        }
    }

    #[tokio::test]
    async fn test_page_without_links_yields_one_page() {
        let fetcher = StaticFetcher::new().with_page("https://example.com", Vec::<String>::new());
        let pages = crawl_all(&Crawler::new(fetcher), "https://example.com").await;

        assert_eq!(
            pages,
            vec![Page {
                url: "https://example.com".to_string(),
                links: BTreeSet::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_multiple_levels() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://example.com",
                [
                    "https://example.com/foo",
                    "https://example.com/bar",
                    "https://example.com/egg",
                ],
            )
            .with_page("https://example.com/foo", Vec::<String>::new())
            .with_page("https://example.com/bar", Vec::<String>::new())
            .with_page("https://example.com/egg", ["https://example.com/spam"])
            .with_page("https://example.com/spam", Vec::<String>::new());

        let pages = crawl_all(&Crawler::new(fetcher), "https://example.com").await;

        assert_eq!(
            by_url(pages),
            expected(&[
                (
                    "https://example.com",
                    &[
                        "https://example.com/foo",
                        "https://example.com/bar",
                        "https://example.com/egg",
                    ],
                ),
                ("https://example.com/foo", &[]),
                ("https://example.com/bar", &[]),
                ("https://example.com/egg", &["https://example.com/spam"]),
                ("https://example.com/spam", &[]),
            ])
        );
    }

    #[tokio::test]
    async fn test_failed_fetches_are_left_out() {
        let fetcher = StaticFetcher::new()
            .with_page(
                "https://example.com",
                [
                    "https://example.com/foo",
                    "https://example.com/bar",
                    "https://example.com/egg",
                ],
            )
            .with_page("https://example.com/egg", ["https://example.com/spam"]);

        let pages = crawl_all(&Crawler::new(fetcher), "https://example.com").await;

        assert_eq!(
            by_url(pages),
            expected(&[
                (
                    "https://example.com",
                    &[
                        "https://example.com/foo",
                        "https://example.com/bar",
                        "https://example.com/egg",
                    ],
                ),
                ("https://example.com/egg", &["https://example.com/spam"]),
            ])
        );
    }

    #[tokio::test]
    async fn test_failed_sibling_does_not_hide_others() {
        let fetcher = StaticFetcher::new()
            .with_page("https://a.test", ["/b", "/c"])
            .with_page("https://a.test/c", Vec::<String>::new());

        let pages = crawl_all(&Crawler::new(fetcher), "https://a.test").await;

        assert_eq!(
            by_url(pages),
            expected(&[
                ("https://a.test", &["https://a.test/b", "https://a.test/c"]),
                ("https://a.test/c", &[]),
            ])
        );
    }

    #[tokio::test]
    async fn test_other_hosts_are_not_crawled() {
        let fetcher = CountingFetcher {
            inner: StaticFetcher::new().with_page(
                "https://egg.example.com",
                [
                    "https://egg.example.com/spam",
                    "https://foo.example.com",
                    "https://example.com",
                    "https://google.com",
                ],
            ),
            ..Default::default()
        };
        let crawler = Crawler::new(fetcher);

        let pages = crawl_all(&crawler, "https://egg.example.com").await;

        assert_eq!(
            by_url(pages),
            expected(&[("https://egg.example.com", &["https://egg.example.com/spam"])])
        );
        assert_eq!(crawler.fetcher.calls("https://foo.example.com"), 0);
        assert_eq!(crawler.fetcher.calls("https://google.com"), 0);
    }

    #[tokio::test]
    async fn test_loops_terminate() {
        let fetcher = StaticFetcher::new().with_page(
            "https://egg.example.com",
            ["https://egg.example.com", "https://egg.example.com/spam"],
        );

        let pages = crawl_all(&Crawler::new(fetcher), "https://egg.example.com").await;

        assert_eq!(
            by_url(pages),
            expected(&[(
                "https://egg.example.com",
                &["https://egg.example.com", "https://egg.example.com/spam"],
            )])
        );
    }

    #[tokio::test]
    async fn test_self_link_and_new_page() {
        let fetcher = StaticFetcher::new()
            .with_page("https://x.test/", ["/", "/next"])
            .with_page("https://x.test/next", ["/"]);

        let pages = crawl_all(&Crawler::new(fetcher), "https://x.test/").await;

        assert_eq!(
            by_url(pages),
            expected(&[
                ("https://x.test/", &["https://x.test/", "https://x.test/next"]),
                ("https://x.test/next", &["https://x.test/"]),
            ])
        );
    }

    #[tokio::test]
    async fn test_diamond_fetches_shared_child_once() {
        let fetcher = CountingFetcher {
            inner: StaticFetcher::new()
                .with_page("https://d.test/a", ["/b", "/c"])
                .with_page("https://d.test/b", ["/d"])
                .with_page("https://d.test/c", ["/d"])
                .with_page("https://d.test/d", ["/a"]),
            ..Default::default()
        };
        let crawler = Crawler::new(fetcher);

        let pages = crawl_all(&crawler, "https://d.test/a").await;

        assert_eq!(pages.len(), 4);
        for url in ["https://d.test/a", "https://d.test/b", "https://d.test/c", "https://d.test/d"] {
            assert_eq!(crawler.fetcher.calls(url), 1, "{url} fetched once");
        }
    }

    #[tokio::test]
    async fn test_invalid_seed_is_rejected_without_fetching() {
        let crawler = Crawler::new(CountingFetcher::default());

        let result = crawler.crawl("not a url");

        assert!(matches!(result, Err(CrawlError::InvalidSeed { ref url, .. }) if url == "not a url"));
        assert!(crawler.fetcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_seed_closes_stream_empty() {
        let pages = crawl_all(&Crawler::new(StaticFetcher::new()), "https://gone.test").await;
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_wide_site_with_small_output_buffer() {
        let children: Vec<String> = (0..250).map(|i| format!("/p{i}")).collect();
        let mut fetcher = StaticFetcher::new().with_page("https://wide.test", children.clone());
        for child in &children {
            fetcher = fetcher.with_page(format!("https://wide.test{child}"), ["/"]);
        }
        let fetcher = fetcher.with_page("https://wide.test/", Vec::<String>::new());

        let pages = crawl_all(
            &Crawler::new(fetcher).with_output_buffer(1),
            "https://wide.test",
        )
        .await;

        // seed + 250 children + "https://wide.test/" (distinct from the seed)
        assert_eq!(pages.len(), 252);
    }

    // A site with no end: every page links to two deeper pages. Signals
    // `dropped` once the last handle to the fetcher is gone.
    struct EndlessSite {
        dropped: Option<tokio::sync::oneshot::Sender<()>>,
    }

    impl LinkFetcher for EndlessSite {
        async fn fetch(&self, url: &str) -> Result<Vec<String>, FetchError> {
            tokio::task::yield_now().await;
            Ok(vec![format!("{url}/x"), format!("{url}/y")])
        }
    }

    impl Drop for EndlessSite {
        fn drop(&mut self) {
            if let Some(dropped) = self.dropped.take() {
                let _ = dropped.send(());
            }
        }
    }

    #[tokio::test]
    async fn test_dropping_the_stream_stops_the_crawl() {
        let (dropped_tx, dropped_rx) = tokio::sync::oneshot::channel();
        let crawler = Crawler::new(EndlessSite {
            dropped: Some(dropped_tx),
        })
        .with_output_buffer(1);

        let mut pages = crawler.crawl("https://endless.test").unwrap();
        let first = pages.next_page().await.expect("seed page");
        assert_eq!(first.url, "https://endless.test");
        assert_eq!(first.links.len(), 2);

        drop(pages);
        drop(crawler);

        // The fetcher is only released once the control loop and every fetch
        // task have exited; a crawl that kept going would never let it go
        tokio::time::timeout(Duration::from_secs(5), dropped_rx)
            .await
            .expect("crawl stopped after the stream was dropped")
            .expect("fetcher dropped");
    }

    #[test]
    fn test_output_buffer_is_at_least_one() {
        let crawler = Crawler::new(StaticFetcher::new()).with_output_buffer(0);
        assert_eq!(crawler.output_buffer, 1);
    }
}
