// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the struct below *is* the CLI. Each field is an
// argument, and the doc comments become the --help text.
//
// Usage:
//   site-crawler https://example.com
//   site-crawler https://example.com --format graph | dot -Tsvg > site.svg
//   site-crawler https://example.com --debug 2> crawl.log
// =============================================================================

use std::time::Duration;

use clap::Parser;
use site_crawler::{FetcherConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl a website within its host and list the links of every page",
    long_about = "site-crawler starts from a URL and follows every link that stays on the same host. \
                  For each page it prints the page URL and the same-host links found on it."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// Print crawl logs to stderr (RUST_LOG refines the filter)
    #[arg(long)]
    pub debug: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::List)]
    pub format: OutputFormat,

    /// Per-request timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Skip pages answered with a non-2xx status instead of crawling their body
    #[arg(long)]
    pub fail_on_status: bool,

    /// How many crawled pages may queue up before the crawler waits for output
    #[arg(long, default_value_t = site_crawler::crawl::DEFAULT_OUTPUT_BUFFER)]
    pub buffer: usize,
}

impl Cli {
    // Builds the HTTP fetcher settings from the flags
    pub fn fetcher_config(&self) -> FetcherConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let config = FetcherConfig::new()
            .with_request_timeout(timeout)
            .with_fail_on_status(self.fail_on_status);
        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.as_str()),
            None => config,
        }
    }
}
