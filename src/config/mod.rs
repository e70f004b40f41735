//! Configuration module for Catalog Enricher
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus the environment overrides applied on top of it.
//!
//! # Example
//!
//! ```no_run
//! use catalog_enricher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("enricher.toml"))).unwrap();
//! println!("Listening on port {}", config.server.port);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, HeaderTable, PacingConfig, ScrapeConfig, ServerConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, load_config, load_config_file, PORT_ENV_VAR};
pub use validation::validate;
