//! Scrape coordinator - top-level request orchestration
//!
//! This module drives one scrape request end to end:
//! - Fetching and parsing the search results page
//! - Handing the summaries to the enrichment pipeline
//! - Recording the request's diagnostic trace
//!
//! A failure while fetching or parsing the search page aborts the request.
//! Per-product failures are absorbed by the pipeline.

use crate::config::{Config, PacingConfig};
use crate::crawler::fetcher::{HeaderProfile, HttpFetcher, PageFetcher};
use crate::crawler::parser::{FlipkartParser, PageParser};
use crate::crawler::pipeline::EnrichmentPipeline;
use crate::logs::RequestLog;
use crate::product::EnrichedProduct;
use crate::ScrapeError;
use std::sync::Arc;
use url::Url;

/// Number of body characters echoed into the log
const PREVIEW_CHARS: usize = 200;

/// Shared scrape machinery; one instance serves every request
#[derive(Clone)]
pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn PageParser>,
    headers: Arc<HeaderProfile>,
    pacing: PacingConfig,
}

impl Coordinator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn PageParser>,
        headers: HeaderProfile,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            fetcher,
            parser,
            headers: Arc::new(headers),
            pacing,
        }
    }

    /// Creates a coordinator with the HTTP fetcher and Flipkart parser
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Failed to build the HTTP client
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        let parser = FlipkartParser::new()?;

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(parser),
            HeaderProfile::from_config(config),
            config.pacing.clone(),
        ))
    }

    /// Creates the diagnostic log for a new request
    pub fn new_log(&self) -> RequestLog {
        RequestLog::with_tracing(self.pacing.log_pause())
    }

    /// Runs one scrape request
    ///
    /// # Arguments
    ///
    /// * `url` - The search results page to start from
    /// * `limit` - Maximum number of products to enrich (already validated, >= 1)
    /// * `log` - The request's diagnostic log
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<EnrichedProduct>)` - One record per product, up to `limit`
    /// * `Err(ScrapeError)` - The search page could not be fetched or parsed
    pub async fn run(
        &self,
        url: &str,
        limit: usize,
        log: &RequestLog,
    ) -> Result<Vec<EnrichedProduct>, ScrapeError> {
        match self.scrape(url, limit, log).await {
            Ok(products) => {
                log.info("Scraping complete.");
                Ok(products)
            }
            Err(e) => {
                log.error(format!("Scraping failed: {}", e));
                Err(e)
            }
        }
    }

    /// Runs one scrape request and waits until every log entry reached its sink
    ///
    /// The flush happens on success and on failure alike.
    pub async fn run_and_flush(
        &self,
        url: &str,
        limit: usize,
        log: &RequestLog,
    ) -> Result<Vec<EnrichedProduct>, ScrapeError> {
        let result = self.run(url, limit, log).await;
        log.flush().await;
        result
    }

    async fn scrape(
        &self,
        url: &str,
        limit: usize,
        log: &RequestLog,
    ) -> Result<Vec<EnrichedProduct>, ScrapeError> {
        log.info(format!("Scraping URL: {}", url));

        let base_url = Url::parse(url)?;
        let page = self.fetcher.fetch_page(url, &self.headers).await?;

        log.info(format!("Response status: {}", page.status_code));
        log.info(format!(
            "Response content-type: {}",
            page.content_type.as_deref().unwrap_or("null")
        ));
        log.info(format!(
            "Response length: {} characters",
            page.body.chars().count()
        ));
        log.info(format!("Response preview: {}", preview(&page.body)));

        let page = page.error_for_status(url)?;

        let page_url = Url::parse(&page.final_url).unwrap_or(base_url);
        let summaries = self.parser.parse_search_results(&page.body, &page_url)?;

        log.info(format!(
            "Found {} products. Streaming detailed information...",
            summaries.len()
        ));

        let pipeline = EnrichmentPipeline::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.parser),
            Arc::clone(&self.headers),
            self.pacing.clone(),
            log.clone(),
        );

        Ok(pipeline.collect(summaries, limit).await)
    }
}

/// First characters of the body with every whitespace run collapsed to one space
fn preview(body: &str) -> String {
    let head: String = body.chars().take(PREVIEW_CHARS).collect();
    let mut out = String::with_capacity(head.len());
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
