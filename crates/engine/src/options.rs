//! Programmatic discovery options.

use crate::config::DiscoveryConfig;
use apiscribe_types::{DocumentInfo, EndpointDescriptor};
use apiscribe_util::ToolNameCasing;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied tool naming function.
pub type ToolNamer = Arc<dyn Fn(&EndpointDescriptor) -> String + Send + Sync>;

/// Settings for one discovery service.
///
/// Built from a [`DiscoveryConfig`] and optionally extended with a custom
/// [`ToolNamer`], which takes precedence over the derived names.
#[derive(Clone)]
pub struct DiscoveryOptions {
    pub info: DocumentInfo,
    pub include_controllers: Vec<String>,
    pub exclude_controllers: Vec<String>,
    pub include_controller_name_in_tool_name: bool,
    pub tool_name_casing: ToolNameCasing,
    pub include_descriptions: bool,
    pub metadata: Map<String, Value>,
    pub tool_namer: Option<ToolNamer>,
}

impl DiscoveryOptions {
    /// Sets the custom tool naming function.
    pub fn with_tool_namer(mut self, namer: impl Fn(&EndpointDescriptor) -> String + Send + Sync + 'static) -> Self {
        self.tool_namer = Some(Arc::new(namer));
        self
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for DiscoveryOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            info: DocumentInfo::from(&config.info),
            include_controllers: config.include_controllers.clone(),
            exclude_controllers: config.exclude_controllers.clone(),
            include_controller_name_in_tool_name: config.include_controller_name_in_tool_name,
            tool_name_casing: config.tool_name_casing,
            include_descriptions: config.include_descriptions,
            metadata: config.metadata.clone(),
            tool_namer: None,
        }
    }
}

impl fmt::Debug for DiscoveryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryOptions")
            .field("info", &self.info)
            .field("include_controllers", &self.include_controllers)
            .field("exclude_controllers", &self.exclude_controllers)
            .field("include_controller_name_in_tool_name", &self.include_controller_name_in_tool_name)
            .field("tool_name_casing", &self.tool_name_casing)
            .field("include_descriptions", &self.include_descriptions)
            .field("metadata", &self.metadata)
            .field("tool_namer", &self.tool_namer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
