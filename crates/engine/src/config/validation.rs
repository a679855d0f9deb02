//! Configuration validation for discovery settings.

use crate::config::DiscoveryConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::debug;

static CONTROLLER_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("controller name regex should compile"));

/// Validate the entire discovery configuration.
pub fn validate_config(config: &DiscoveryConfig) -> Result<(), ValidationError> {
    if config.info.schema_version.trim().is_empty() {
        return Err(ValidationError::EmptySchemaVersion);
    }

    for name in config.include_controllers.iter().chain(&config.exclude_controllers) {
        validate_controller_name(name)?;
    }

    if let Some(name) = config
        .include_controllers
        .iter()
        .find(|name| config.exclude_controllers.contains(name))
    {
        return Err(ValidationError::ConflictingControllerLists { name: name.clone() });
    }

    config
        .http_server
        .bind_address
        .parse::<SocketAddr>()
        .map_err(|error| ValidationError::InvalidBindAddress {
            address: config.http_server.bind_address.clone(),
            reason: error.to_string(),
        })?;

    debug!(
        include = config.include_controllers.len(),
        exclude = config.exclude_controllers.len(),
        "validated discovery configuration"
    );
    Ok(())
}

/// Validate a controller name used in an inclusion or exclusion list.
pub fn validate_controller_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidControllerName {
            name: name.to_string(),
            reason: "Controller name cannot be empty".to_string(),
        });
    }

    if !CONTROLLER_NAME_REGEX.is_match(name) {
        return Err(ValidationError::InvalidControllerName {
            name: name.to_string(),
            reason: "Controller name must be a simple type name (letters, digits, underscores)".to_string(),
        });
    }

    Ok(())
}

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid controller name '{name}': {reason}")]
    InvalidControllerName { name: String, reason: String },

    #[error("Controller '{name}' is both included and excluded")]
    ConflictingControllerLists { name: String },

    #[error("Schema version cannot be empty")]
    EmptySchemaVersion,

    #[error("Invalid bind address '{address}': {reason}")]
    InvalidBindAddress { address: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_controller_name_valid() {
        assert!(validate_controller_name("OrdersController").is_ok());
        assert!(validate_controller_name("Orders").is_ok());
        assert!(validate_controller_name("_Internal2").is_ok());
    }

    #[test]
    fn test_validate_controller_name_invalid() {
        assert!(validate_controller_name("").is_err());
        assert!(validate_controller_name("Shop.OrdersController").is_err());
        assert!(validate_controller_name("Orders Controller").is_err());
        assert!(validate_controller_name("1Orders").is_err());
    }

    #[test]
    fn test_validate_config_rejects_conflicting_lists() {
        let config = DiscoveryConfig {
            include_controllers: vec!["OrdersController".to_string()],
            exclude_controllers: vec!["OrdersController".to_string()],
            ..Default::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::ConflictingControllerLists { .. })
        ));
    }

    #[test]
    fn test_validate_config_rejects_blank_schema_version() {
        let mut config = DiscoveryConfig::default();
        config.info.schema_version = "  ".to_string();

        assert!(matches!(validate_config(&config), Err(ValidationError::EmptySchemaVersion)));
    }

    #[test]
    fn test_validate_config_rejects_bad_bind_address() {
        let mut config = DiscoveryConfig::default();
        config.http_server.bind_address = "localhost".to_string();

        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidBindAddress { .. })
        ));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&DiscoveryConfig::default()).is_ok());
    }
}
