//! Discovery document assembly and caching.

use crate::documentation::{DocumentationSource, NoDocumentation};
use crate::error::DiscoveryError;
use crate::introspection::TypeIntrospector;
use crate::manifest::ApiManifest;
use crate::options::DiscoveryOptions;
use crate::schema::{SchemaCache, TypeSchemaEngine};
use crate::tool_builder::ToolBuilder;
use apiscribe_types::{Document, EndpointDescriptor};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Enumerates the endpoints exposed by the host.
pub trait EndpointSource: Send + Sync {
    fn endpoints(&self) -> anyhow::Result<Vec<EndpointDescriptor>>;
}

impl EndpointSource for Vec<EndpointDescriptor> {
    fn endpoints(&self) -> anyhow::Result<Vec<EndpointDescriptor>> {
        Ok(self.clone())
    }
}

/// Generates the discovery document and keeps it until invalidated.
///
/// The document and the schema cache are owned here. Generation runs as a
/// critical section: concurrent callers wait for the first pass and then
/// share its result.
pub struct DiscoveryService {
    endpoints: Arc<dyn EndpointSource>,
    introspector: Arc<dyn TypeIntrospector>,
    documentation: Arc<dyn DocumentationSource>,
    options: DiscoveryOptions,
    schema_cache: SchemaCache,
    document: Mutex<Option<Arc<Document>>>,
}

impl DiscoveryService {
    pub fn new(
        endpoints: Arc<dyn EndpointSource>,
        introspector: Arc<dyn TypeIntrospector>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            endpoints,
            introspector,
            documentation: Arc::new(NoDocumentation),
            options,
            schema_cache: SchemaCache::new(),
            document: Mutex::new(None),
        }
    }

    /// Creates a service backed by one manifest for both endpoints and types.
    pub fn from_manifest(manifest: ApiManifest, options: DiscoveryOptions) -> Self {
        let manifest = Arc::new(manifest);
        Self::new(manifest.clone(), manifest, options)
    }

    /// Sets the documentation source.
    pub fn with_documentation(mut self, documentation: Arc<dyn DocumentationSource>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Returns the discovery document, generating it on first use.
    ///
    /// Until [`invalidate_cache`](Self::invalidate_cache) is called every call
    /// returns the same `Arc`. A failed pass caches nothing.
    pub fn generate_document(&self) -> Result<Arc<Document>, DiscoveryError> {
        let mut slot = self.lock_document();
        if let Some(document) = slot.as_ref() {
            debug!("serving cached discovery document");
            return Ok(Arc::clone(document));
        }

        let document = Arc::new(self.assemble()?);
        *slot = Some(Arc::clone(&document));
        info!(
            tools = document.tools.len(),
            cached_schemas = self.schema_cache.len(),
            "generated discovery document"
        );
        Ok(document)
    }

    /// Returns the `{"tools": [...]}` view of the cached document.
    pub fn tools_listing(&self) -> Result<Value, DiscoveryError> {
        let document = self.generate_document()?;
        Ok(serde_json::to_value(document.listing())?)
    }

    /// Drops the cached document and every memoized schema.
    ///
    /// The schema cache is cleared under the document lock so no pass can
    /// observe it half-emptied.
    pub fn invalidate_cache(&self) {
        let mut slot = self.lock_document();
        slot.take();
        self.schema_cache.clear();
        debug!("discovery cache invalidated");
    }

    /// Locks the document slot, recovering from a pass that panicked.
    ///
    /// A panicked pass may have left placeholders in the schema cache, so
    /// both caches are discarded before the lock is handed out.
    fn lock_document(&self) -> MutexGuard<'_, Option<Arc<Document>>> {
        self.document.lock().unwrap_or_else(|poisoned| {
            warn!("previous discovery pass panicked; discarding cached state");
            self.document.clear_poison();
            let mut slot = poisoned.into_inner();
            slot.take();
            self.schema_cache.clear();
            slot
        })
    }

    fn assemble(&self) -> Result<Document, DiscoveryError> {
        let endpoints = self.endpoints.endpoints().map_err(DiscoveryError::EndpointSource)?;
        let engine = TypeSchemaEngine::new(
            self.introspector.as_ref(),
            self.documentation.as_ref(),
            &self.schema_cache,
            self.options.include_descriptions,
        );
        let mut builder = ToolBuilder::new(engine, &self.options);
        let tools = endpoints.iter().filter_map(|endpoint| builder.build(endpoint)).collect();

        Ok(Document {
            info: self.options.info.clone(),
            tools,
            metadata: self.options.metadata.clone(),
        })
    }
}
