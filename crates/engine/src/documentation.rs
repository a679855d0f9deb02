//! Documentation text lookup.
//!
//! Documentation is extracted from the host ahead of time into an index keyed
//! by member identifiers:
//!
//! - `M:<DeclaringType>.<Method>` for endpoint summaries
//! - `M:<DeclaringType>.<Method>#<parameter>` for parameter descriptions
//! - `P:<DeclaringType>.<Property>` for property descriptions

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Source of human-readable summaries for endpoints, parameters and properties.
pub trait DocumentationSource: Send + Sync {
    /// Summary of an endpoint method.
    fn method_summary(&self, declaring_type: &str, method: &str) -> Option<&str>;
    /// Description of one method parameter.
    fn parameter_summary(&self, declaring_type: &str, method: &str, parameter: &str) -> Option<&str>;
    /// Description of a property declared on `declaring_type`.
    fn property_summary(&self, declaring_type: &str, property: &str) -> Option<&str>;
}

/// Documentation source that never has anything to say.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocumentation;

impl DocumentationSource for NoDocumentation {
    fn method_summary(&self, _declaring_type: &str, _method: &str) -> Option<&str> {
        None
    }

    fn parameter_summary(&self, _declaring_type: &str, _method: &str, _parameter: &str) -> Option<&str> {
        None
    }

    fn property_summary(&self, _declaring_type: &str, _property: &str) -> Option<&str> {
        None
    }
}

/// Pre-extracted documentation index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationIndex {
    /// Summaries keyed by member identifier
    #[serde(default)]
    pub members: HashMap<String, String>,
}

impl DocumentationIndex {
    /// Loads an index from a JSON or YAML file, chosen by extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("read documentation index {}", path.display()))?;
        let index: DocumentationIndex = if is_yaml(path) {
            serde_yaml::from_str(&content).with_context(|| format!("parse documentation index {}", path.display()))?
        } else {
            serde_json::from_str(&content).with_context(|| format!("parse documentation index {}", path.display()))?
        };
        debug!(path = %path.display(), members = index.members.len(), "loaded documentation index");
        Ok(index)
    }

    /// Adds or replaces one entry.
    pub fn insert(&mut self, key: impl Into<String>, summary: impl Into<String>) {
        self.members.insert(key.into(), summary.into());
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.members
            .get(key)
            .map(|summary| summary.trim())
            .filter(|summary| !summary.is_empty())
    }
}

impl DocumentationSource for DocumentationIndex {
    fn method_summary(&self, declaring_type: &str, method: &str) -> Option<&str> {
        self.lookup(&method_key(declaring_type, method))
    }

    fn parameter_summary(&self, declaring_type: &str, method: &str, parameter: &str) -> Option<&str> {
        self.lookup(&format!("{}#{parameter}", method_key(declaring_type, method)))
    }

    fn property_summary(&self, declaring_type: &str, property: &str) -> Option<&str> {
        self.lookup(&format!("P:{declaring_type}.{property}"))
    }
}

/// Builds the member identifier of a method.
pub fn method_key(declaring_type: &str, method: &str) -> String {
    format!("M:{declaring_type}.{method}")
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml"))
}
