//! Host metadata snapshots.
//!
//! An [`ApiManifest`] is the serialized form of everything discovery needs
//! from a host: its endpoints and the definitions of the user types they
//! reference. It serves both as the [`EndpointSource`] and, through an
//! embedded [`TypeCatalog`], as the [`TypeIntrospector`].

use crate::discovery::EndpointSource;
use crate::documentation::is_yaml;
use crate::error::ReflectionError;
use crate::introspection::{TypeCatalog, TypeIntrospector};
use apiscribe_types::{EndpointDescriptor, TypeDef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),
}

/// On-disk manifest layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    #[serde(default)]
    pub endpoints: Vec<EndpointDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

/// Loaded host metadata.
#[derive(Debug, Clone, Default)]
pub struct ApiManifest {
    endpoints: Vec<EndpointDescriptor>,
    catalog: TypeCatalog,
}

impl ApiManifest {
    /// Creates a manifest, rejecting duplicate type names.
    pub fn new(endpoints: Vec<EndpointDescriptor>, types: Vec<TypeDef>) -> Result<Self, ManifestError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = types.iter().find(|type_def| !seen.insert(type_def.name.as_str())) {
            return Err(ManifestError::DuplicateType(duplicate.name.clone()));
        }
        Ok(Self {
            endpoints,
            catalog: TypeCatalog::from_types(types),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = serde_json::from_str(content)?;
        Self::new(file.endpoints, file.types)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        let file: ManifestFile = serde_yaml::from_str(content)?;
        Self::new(file.endpoints, file.types)
    }

    pub fn endpoints(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }
}

/// Loads a manifest from a JSON or YAML file, chosen by extension.
pub fn load_manifest_from_path(path: &Path) -> Result<ApiManifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = if is_yaml(path) {
        ApiManifest::from_yaml_str(&content)?
    } else {
        ApiManifest::from_json_str(&content)?
    };
    debug!(
        path = %path.display(),
        endpoints = manifest.endpoints.len(),
        types = manifest.catalog.len(),
        "loaded manifest"
    );
    Ok(manifest)
}

impl EndpointSource for ApiManifest {
    fn endpoints(&self) -> anyhow::Result<Vec<EndpointDescriptor>> {
        Ok(self.endpoints.clone())
    }
}

impl TypeIntrospector for ApiManifest {
    fn describe(&self, type_name: &str) -> Result<TypeDef, ReflectionError> {
        self.catalog.describe(type_name)
    }
}
