//! Type schema expansion and its memo cache.

mod cache;
mod engine;
pub mod rules;

pub use cache::SchemaCache;
pub use engine::TypeSchemaEngine;
