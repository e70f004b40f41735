use crate::config::types::{
    Config, FetcherConfig, HeaderTable, PacingConfig, ScrapeConfig, ServerConfig,
};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_scrape_config(&config.scrape)?;
    validate_pacing_config(&config.pacing)?;
    validate_fetcher_config(&config.fetcher)?;
    if let Some(headers) = &config.headers {
        validate_headers(headers)?;
    }
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("port must be >= 1".to_string()));
    }

    Ok(())
}

fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.default_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "default_limit must be >= 1, got {}",
            config.default_limit
        )));
    }

    Ok(())
}

/// Validates that both pacing windows are well-formed
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.detail_delay_min_ms > config.detail_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "detail delay window is inverted: {}ms > {}ms",
            config.detail_delay_min_ms, config.detail_delay_max_ms
        )));
    }

    if config.item_gap_min_ms > config.item_gap_max_ms {
        return Err(ConfigError::Validation(format!(
            "item gap window is inverted: {}ms > {}ms",
            config.item_gap_min_ms, config.item_gap_max_ms
        )));
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates custom header names and values as HTTP tokens
fn validate_headers(headers: &HeaderTable) -> Result<(), ConfigError> {
    for (name, value) in headers.iter() {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name: '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }
    Ok(())
}
