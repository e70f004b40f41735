//! Catalog Enricher main entry point
//!
//! This is the command-line interface for the catalog scraper service.

use anyhow::{Context, Result};
use catalog_enricher::config::load_config;
use catalog_enricher::crawler::scrape;
use catalog_enricher::server::serve;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog Enricher: a polite catalog scraper
///
/// Serves `POST /scrape`, which fetches a catalog search page, enriches a
/// bounded number of products with their detail pages, and returns the
/// merged records with a diagnostic log.
#[derive(Parser, Debug)]
#[command(name = "catalog-enricher")]
#[command(version)]
#[command(about = "A polite catalog scraper", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape this search page once, print the result as JSON, and exit
    #[arg(long, value_name = "URL")]
    once: Option<String>,

    /// Number of products to enrich in --once mode
    #[arg(long, requires = "once")]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!("Configuration loaded: {:?}", config);

    match cli.once {
        Some(url) => {
            let limit = cli.limit.unwrap_or(config.scrape.default_limit).max(1);
            let (products, logs) = scrape(&config, &url, limit)
                .await
                .context("Scrape failed")?;
            let output = serde_json::json!({ "products": products, "logs": logs });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => serve(&config).await.context("Server error")?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            // Only show errors
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("catalog_enricher=info,warn"),
                1 => EnvFilter::new("catalog_enricher=debug,tower_http=debug,info"),
                2 => EnvFilter::new("catalog_enricher=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
