//! Configuration IO helpers for discovery settings.

use crate::config::{ConfigError, DiscoveryConfig, validate_config};
use crate::documentation::is_yaml;
use apiscribe_util::expand_tilde;
use dirs_next::config_dir;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the configuration location.
pub const CONFIG_PATH_ENV: &str = "APISCRIBE_CONFIG_PATH";

/// Returns the default path for the discovery configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apiscribe")
        .join("discovery.json")
}

/// Loads and parses discovery configuration from the default path.
pub fn load_config() -> Result<DiscoveryConfig, ConfigError> {
    let path = default_config_path();
    load_config_from_path(&path)
}

/// Loads and parses discovery configuration from a specific path.
///
/// A missing file yields the defaults. `.yaml`/`.yml` files are parsed as
/// YAML, anything else as JSON.
pub fn load_config_from_path(path: &Path) -> Result<DiscoveryConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no discovery config found; using defaults");
        return Ok(DiscoveryConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: DiscoveryConfig = if is_yaml(path) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    validate_config(&config)?;
    Ok(config)
}
