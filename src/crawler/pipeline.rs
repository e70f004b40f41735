//! Sequential enrichment pipeline
//!
//! Walks the search results one product at a time. For each product it waits
//! a randomized delay, fetches and parses the detail page, merges it with the
//! summary, and yields the record before touching the next product. A failing
//! product is logged and yielded with default detail fields; it never ends the
//! run.

use crate::config::PacingConfig;
use crate::crawler::fetcher::{HeaderProfile, PageFetcher};
use crate::crawler::parser::PageParser;
use crate::logs::RequestLog;
use crate::product::{EnrichedProduct, ProductDetail, ProductSummary};
use crate::ScrapeError;
use async_stream::stream;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Enriches search summaries with their detail pages, strictly in order
///
/// A pipeline is consumed by [`EnrichmentPipeline::run`]; enriching another
/// batch needs a new instance.
pub struct EnrichmentPipeline {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn PageParser>,
    headers: Arc<HeaderProfile>,
    pacing: PacingConfig,
    log: RequestLog,
}

impl EnrichmentPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn PageParser>,
        headers: Arc<HeaderProfile>,
        pacing: PacingConfig,
        log: RequestLog,
    ) -> Self {
        Self {
            fetcher,
            parser,
            headers,
            pacing,
            log,
        }
    }

    /// Lazily yields one record per summary, up to `cap`, in input order
    ///
    /// Nothing is fetched until the stream is polled, and product `i + 1` is
    /// not started until product `i` has been yielded.
    pub fn run(self, summaries: Vec<ProductSummary>, cap: usize) -> BoxStream<'static, EnrichedProduct> {
        Box::pin(stream! {
            let total = summaries.len().min(cap);

            for (index, summary) in summaries.into_iter().take(total).enumerate() {
                let position = index + 1;
                self.log.info(format!(
                    "\nFetching details for product {}: {}",
                    position, summary.product_name
                ));

                pause(self.pacing.detail_delay()).await;

                let record = match self.fetch_detail(&summary).await {
                    Ok(detail) => EnrichedProduct::merge(summary, Some(detail)),
                    Err(e) => {
                        self.log.error(format!(
                            "❌ Error fetching details for {}: {}",
                            summary.product_name, e
                        ));
                        EnrichedProduct::fallback(summary)
                    }
                };

                for line in record.summary_lines(position) {
                    self.log.info(line);
                }

                yield record;

                if position < total {
                    pause(self.pacing.item_gap()).await;
                }
            }
        })
    }

    /// Drives [`run`](Self::run) to completion
    pub async fn collect(self, summaries: Vec<ProductSummary>, cap: usize) -> Vec<EnrichedProduct> {
        self.run(summaries, cap).collect().await
    }

    async fn fetch_detail(&self, summary: &ProductSummary) -> Result<ProductDetail, ScrapeError> {
        let page = self
            .fetcher
            .fetch_page(&summary.product_link, &self.headers)
            .await?
            .error_for_status(&summary.product_link)?;
        Ok(self.parser.parse_product_details(&page.body)?)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
