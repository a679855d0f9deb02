//! # Apiscribe Engine
//!
//! The Apiscribe engine turns a web-API host's endpoint and type metadata into
//! a tool-discovery document: one tool per HTTP endpoint, each with an input
//! schema describing its parameters and an output schema describing its
//! result.
//!
//! ## Usage
//!
//! ```rust
//! use apiscribe_engine::{ApiManifest, DiscoveryOptions, DiscoveryService};
//!
//! let manifest = ApiManifest::from_json_str(r#"{
//!   "endpoints": [{
//!     "controller": "Orders",
//!     "action": "Get",
//!     "declaringType": "Shop.OrdersController",
//!     "attributes": [{ "kind": "httpMethod", "verb": "GET", "template": "api/orders/{id}" }],
//!     "parameters": [{ "name": "id", "type": "int" }],
//!     "returnType": "Task<Shop.Order>"
//!   }],
//!   "types": [{
//!     "name": "Shop.Order",
//!     "shape": { "kind": "object", "properties": [{ "name": "Id", "type": "int" }] }
//!   }]
//! }"#)?;
//!
//! let service = DiscoveryService::from_manifest(manifest, DiscoveryOptions::default());
//! let document = service.generate_document()?;
//! assert_eq!(document.tools[0].name, "Orders_Get");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`introspection`**: type descriptor lookup ([`TypeIntrospector`], [`TypeCatalog`])
//! - **`schema`**: type-to-schema expansion with cycle handling and memoization
//! - **`parameter_source`**: binding-source inference for endpoint parameters
//! - **`tool_builder`**: per-endpoint tool construction
//! - **`discovery`**: document assembly and caching ([`DiscoveryService`])
//! - **`config`**, **`documentation`**, **`manifest`**: inputs

pub mod config;
pub mod discovery;
pub mod documentation;
pub mod error;
pub mod introspection;
pub mod manifest;
pub mod options;
pub mod parameter_source;
pub mod schema;
pub mod tool_builder;

pub use config::{ConfigError, DiscoveryConfig, ValidationError, default_config_path, load_config, load_config_from_path};
pub use discovery::{DiscoveryService, EndpointSource};
pub use documentation::{DocumentationIndex, DocumentationSource, NoDocumentation};
pub use error::{DiscoveryError, ReflectionError, ToolBuildError};
pub use introspection::{TypeCatalog, TypeIntrospector};
pub use manifest::{ApiManifest, ManifestError, load_manifest_from_path};
pub use options::{DiscoveryOptions, ToolNamer};
pub use parameter_source::{SourceResolution, resolve_source};
pub use schema::{SchemaCache, TypeSchemaEngine};
pub use tool_builder::{SkipReason, ToolBuilder, skip_reason};
