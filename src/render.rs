// src/render.rs
// =============================================================================
// Turns crawled pages into text, one page at a time.
//
// Formats:
// - list:  "https://x.com: https://x.com/a, https://x.com/b"
// - graph: a Graphviz digraph, one edge per link (pipe it into `dot`)
// - json:  one {"url": ..., "links": [...]} object per line
//
// Pages are written as they arrive, so a long crawl shows progress instead
// of printing everything at the end.
// =============================================================================

use std::io::{self, Write};

use clap::ValueEnum;

use crate::crawl::Page;

/// How crawled pages are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One "URL: link, link" line per page
    #[default]
    List,
    /// Graphviz DOT description of the link graph
    Graph,
    /// One JSON object per page, one per line
    Json,
}

/// Writes pages to `out` in the chosen format
pub struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    // Writes whatever has to come before the first page
    pub fn begin(&mut self) -> io::Result<()> {
        match self.format {
            OutputFormat::Graph => writeln!(self.out, "digraph crawl {{"),
            OutputFormat::List | OutputFormat::Json => Ok(()),
        }
    }

    pub fn page(&mut self, page: &Page) -> io::Result<()> {
        match self.format {
            OutputFormat::List => {
                let links: Vec<&str> = page.links.iter().map(String::as_str).collect();
                writeln!(self.out, "{}: {}", page.url, links.join(", "))
            }
            OutputFormat::Graph => {
                let from = dot_quote(&page.url);
                writeln!(self.out, "    {from};")?;
                for link in &page.links {
                    writeln!(self.out, "    {from} -> {};", dot_quote(link))?;
                }
                Ok(())
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, page)?;
                writeln!(self.out)
            }
        }
    }

    // Writes whatever has to come after the last page, then flushes
    pub fn finish(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Graph {
            writeln!(self.out, "}}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// DOT string literal: quotes and backslashes escaped
fn dot_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
