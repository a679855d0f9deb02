//! Memo cache for expanded type schemas.

use apiscribe_types::SchemaRef;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum CacheEntry {
    Resolved(SchemaRef),
    Placeholder(SchemaRef),
}

/// Type-identity keyed schema cache.
///
/// Entries are either fully resolved schemas or circular-reference
/// placeholders stored while their type is still being expanded. The cache is
/// owned by the discovery service and lives until explicitly cleared.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resolved schema for `key`, ignoring placeholders.
    pub fn resolved(&self, key: &str) -> Option<SchemaRef> {
        match self.lock().get(key) {
            Some(CacheEntry::Resolved(node)) => Some(Arc::clone(node)),
            _ => None,
        }
    }

    /// Stores a circular-reference placeholder for `key`.
    ///
    /// An existing placeholder is kept so every back-reference shares it.
    pub fn insert_placeholder(&self, key: &str, placeholder: SchemaRef) -> SchemaRef {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(CacheEntry::Placeholder(existing)) => Arc::clone(existing),
            _ => {
                entries.insert(key.to_string(), CacheEntry::Placeholder(Arc::clone(&placeholder)));
                placeholder
            }
        }
    }

    /// Stores the resolved schema for `key`, replacing any placeholder.
    pub fn insert_resolved(&self, key: &str, node: SchemaRef) {
        self.lock().insert(key.to_string(), CacheEntry::Resolved(node));
    }

    /// Whether `node` is a placeholder currently held by the cache.
    pub fn is_placeholder(&self, node: &SchemaRef) -> bool {
        self.lock().values().any(|entry| match entry {
            CacheEntry::Placeholder(placeholder) => Arc::ptr_eq(placeholder, node),
            CacheEntry::Resolved(_) => false,
        })
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are only ever replaced whole.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscribe_types::{SchemaKind, SchemaNode};

    #[test]
    fn placeholders_are_not_returned_as_resolved() {
        let cache = SchemaCache::new();
        let placeholder = Arc::new(SchemaNode::circular_reference("Category"));

        cache.insert_placeholder("Category", Arc::clone(&placeholder));

        assert!(cache.resolved("Category").is_none());
        assert!(cache.is_placeholder(&placeholder));
    }

    #[test]
    fn resolved_node_replaces_placeholder() {
        let cache = SchemaCache::new();
        let placeholder = Arc::new(SchemaNode::circular_reference("Category"));
        let resolved = Arc::new(SchemaNode::of_kind(SchemaKind::Object));

        cache.insert_placeholder("Category", Arc::clone(&placeholder));
        cache.insert_resolved("Category", Arc::clone(&resolved));

        let hit = cache.resolved("Category").expect("resolved entry");
        assert!(Arc::ptr_eq(&hit, &resolved));
        assert!(!cache.is_placeholder(&placeholder));
    }

    #[test]
    fn repeated_placeholder_inserts_share_one_node() {
        let cache = SchemaCache::new();
        let first = cache.insert_placeholder("Node", Arc::new(SchemaNode::circular_reference("Node")));
        let second = cache.insert_placeholder("Node", Arc::new(SchemaNode::circular_reference("Node")));

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = SchemaCache::new();
        cache.insert_resolved("int", Arc::new(SchemaNode::of_kind(SchemaKind::Integer)));

        cache.clear();

        assert!(cache.is_empty());
    }
}
