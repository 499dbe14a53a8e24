// src/main.rs
// =============================================================================
// This is the entry point of the site-crawler CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the HTTP fetcher and the (optional) logger
// 3. Start the crawl and print every page as soon as it arrives
// 4. Exit with a proper code (0 = done, 2 = the crawl could not start)
//
// All the crawling logic lives in the library (src/lib.rs); this file only
// wires flags to it and prints results.
// =============================================================================

mod cli;

use std::io;

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;

use cli::Cli;
use site_crawler::logging::build_dispatch;
use site_crawler::{Crawler, HttpFetcher, Renderer};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = crawl finished
//   Ok(2) = the crawl could not start (bad URL)
//   Err   = anything else (client setup, writing output)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let fetcher = HttpFetcher::with_config(&cli.fetcher_config())?;
    let crawler = Crawler::new(fetcher)
        .with_dispatch(build_dispatch(cli.debug))
        .with_output_buffer(cli.buffer);

    let mut pages = match crawler.crawl(&cli.url) {
        Ok(pages) => pages,
        Err(e) => {
            eprintln!("Error starting crawling: {}", e);
            return Ok(2);
        }
    };

    let stdout = io::stdout();
    let mut renderer = Renderer::new(stdout.lock(), cli.format);
    renderer.begin()?;
    while let Some(page) = pages.next().await {
        renderer.page(&page)?;
    }
    renderer.finish()?;

    Ok(0)
}
