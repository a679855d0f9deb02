//! Configuration management for discovery.
//! This module handles parsing and validation of the
//! ~/.config/apiscribe/discovery.json configuration file.

mod io;
mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path};
pub use model::{ConfigError, DiscoveryConfig, HttpServerConfig, InfoConfig};
pub use validation::{ValidationError, validate_config, validate_controller_name};
