//! Error types raised by the discovery engine.

use apiscribe_types::TypeExprError;
use apiscribe_util::RouteTemplateError;
use thiserror::Error;

/// A type could not be described by the introspector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("invalid type expression: {0}")]
    InvalidTypeExpression(#[from] TypeExprError),

    #[error("type '{name}' is ambiguous: {candidates:?}")]
    Ambiguous { name: String, candidates: Vec<String> },
}

/// Building an endpoint's input schema failed.
///
/// The builder recovers from these by emitting a minimal fallback schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolBuildError {
    #[error("route template error: {0}")]
    RouteTemplate(#[from] RouteTemplateError),

    #[error("parameters '{first}' and '{second}' both bind to input key '{key}'")]
    DuplicateInputKey { key: String, first: String, second: String },
}

/// A whole discovery pass failed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to enumerate endpoints: {0}")]
    EndpointSource(#[source] anyhow::Error),

    #[error("failed to serialize discovery output: {0}")]
    Serialization(#[from] serde_json::Error),
}
