//! Data models for discovery configuration.

use apiscribe_types::DocumentInfo;
use apiscribe_util::ToolNameCasing;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ValidationError;

/// Discovery configuration file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DiscoveryConfig {
    /// Static document information block.
    pub info: InfoConfig,
    /// Controllers to include; empty means all.
    pub include_controllers: Vec<String>,
    /// Controllers to exclude.
    pub exclude_controllers: Vec<String>,
    /// Whether tool names are `Controller_Action` rather than the bare action.
    pub include_controller_name_in_tool_name: bool,
    /// Casing applied to derived tool names.
    pub tool_name_casing: ToolNameCasing,
    /// Whether descriptions are attached to tools, parameters and properties.
    pub include_descriptions: bool,
    /// Optional path to a pre-extracted documentation index.
    pub documentation_path: Option<String>,
    /// Open metadata copied into the document.
    pub metadata: Map<String, Value>,
    /// Local HTTP server settings.
    pub http_server: HttpServerConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            info: InfoConfig::default(),
            include_controllers: Vec::new(),
            exclude_controllers: Vec::new(),
            include_controller_name_in_tool_name: true,
            tool_name_casing: ToolNameCasing::default(),
            include_descriptions: true,
            documentation_path: None,
            metadata: Map::new(),
            http_server: HttpServerConfig::default(),
        }
    }
}

/// Document information as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct InfoConfig {
    pub schema_version: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        let DocumentInfo {
            schema_version,
            title,
            description,
        } = DocumentInfo::default();
        Self {
            schema_version,
            title,
            description,
        }
    }
}

impl From<&InfoConfig> for DocumentInfo {
    fn from(info: &InfoConfig) -> Self {
        DocumentInfo {
            schema_version: info.schema_version.clone(),
            title: info.title.clone(),
            description: info.description.clone(),
        }
    }
}

/// Configuration for the local discovery HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct HttpServerConfig {
    /// Bind address (for example, "127.0.0.1:0").
    pub bind_address: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:62889".to_string(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let config: DiscoveryConfig = serde_json::from_str("{}").expect("deserialize config");

        assert_eq!(config, DiscoveryConfig::default());
        assert!(config.include_controller_name_in_tool_name);
        assert_eq!(config.info.schema_version, "1.0");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<DiscoveryConfig>(r#"{ "includeControlers": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn camel_case_fields_deserialize() {
        let json = r#"{
            "info": { "schemaVersion": "2.0", "title": "Shop" },
            "excludeControllers": ["AdminController"],
            "toolNameCasing": "snake",
            "httpServer": { "bindAddress": "0.0.0.0:8080" }
        }"#;
        let config: DiscoveryConfig = serde_json::from_str(json).expect("deserialize config");

        assert_eq!(DocumentInfo::from(&config.info).title.as_deref(), Some("Shop"));
        assert_eq!(config.exclude_controllers, vec!["AdminController".to_string()]);
        assert_eq!(config.tool_name_casing, ToolNameCasing::Snake);
        assert_eq!(config.http_server.bind_address, "0.0.0.0:8080");
    }
}
