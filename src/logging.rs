// src/logging.rs
// =============================================================================
// Builds the logger a Crawler reports to.
//
// Nothing here installs a global subscriber. The Dispatch is handed to
// Crawler::with_dispatch, and every task the crawler spawns runs under it.
// Without --debug the crawler gets Dispatch::none() and stays silent.
//
// Log lines go to stderr so they never mix with the crawl output on stdout.
// RUST_LOG overrides the default filter, e.g. RUST_LOG=site_crawler=trace.
// =============================================================================

use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_FILTER: &str = "site_crawler=debug";

/// Returns a stderr logger when `debug` is set, a no-op logger otherwise
pub fn build_dispatch(debug: bool) -> Dispatch {
    if !debug {
        return Dispatch::none();
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();

    Dispatch::new(subscriber)
}
