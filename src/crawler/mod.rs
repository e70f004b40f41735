//! Crawler module for catalog scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with a browser-like header profile
//! - HTML parsing of search and product pages
//! - The sequential enrichment pipeline
//! - Overall request coordination

mod coordinator;
mod fetcher;
mod parser;
mod pipeline;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, FetchError, FetchedPage, HeaderProfile, HttpFetcher, PageFetcher,
    BROWSER_HEADERS,
};
pub use parser::{parse_price, parse_rating, FlipkartParser, FlipkartSelectors, PageParser, ParseError};
pub use pipeline::EnrichmentPipeline;

use crate::config::Config;
use crate::product::EnrichedProduct;
use crate::{LogEntry, ScrapeError};

/// Runs a single scrape outside the HTTP server
///
/// This is the entry point for one-shot runs. It will:
/// 1. Build the HTTP fetcher and parser from the configuration
/// 2. Fetch and parse the search page
/// 3. Enrich up to `limit` products
/// 4. Return the records together with the diagnostic trace
///
/// The trace is flushed to the tracing output before this returns, including
/// on failure.
///
/// # Arguments
///
/// * `config` - The service configuration
/// * `url` - The search results page
/// * `limit` - Maximum number of products to enrich
pub async fn scrape(
    config: &Config,
    url: &str,
    limit: usize,
) -> Result<(Vec<EnrichedProduct>, Vec<LogEntry>), ScrapeError> {
    let coordinator = Coordinator::from_config(config)?;
    let log = coordinator.new_log();
    let products = coordinator.run_and_flush(url, limit, &log).await?;
    Ok((products, log.entries()))
}
