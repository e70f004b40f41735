use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable that overrides `server.port`
pub const PORT_ENV_VAR: &str = "PORT";

/// Loads the configuration, applies environment overrides, and validates it
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file; defaults are used when `None`
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Reads and parses a TOML configuration file without validating it
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Applies environment overrides using the given variable lookup
///
/// An unset or empty `PORT` leaves the configured port untouched.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        config.server.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv {
                name: PORT_ENV_VAR,
                value,
            })?;
    }

    Ok(())
}
