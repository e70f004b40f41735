//! Catalog Enricher: a polite catalog scraper
//!
//! This crate fetches a catalog search page, walks a bounded number of the
//! listed products one at a time, enriches each listing with its detail page,
//! and returns the merged records together with an ordered diagnostic log.

pub mod config;
pub mod crawler;
pub mod logs;
pub mod product;
pub mod server;

use thiserror::Error;

/// Main error type for scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] crawler::FetchError),

    #[error(transparent)]
    Parse(#[from] crawler::ParseError),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid environment variable {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, EnrichmentPipeline};
pub use logs::{LogEntry, LogLevel, RequestLog};
pub use product::{EnrichedProduct, ProductDetail, ProductSummary};
