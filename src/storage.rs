//! Concurrent storage behind a scope
//!
//! Uses DashMap for lock-free concurrent access.

use crate::value::Value;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe key/value storage for one scope
///
/// Uses `DashMap` with `ahash` for concurrent reads and writes.
/// A local scope's storage keeps a parent link to the global storage,
/// which is consulted when a key is not bound locally.
pub(crate) struct ScopeStorage {
    /// Map from key to value
    values: DashMap<String, Value, RandomState>,
    /// Fallback storage (the global scope) for local scopes
    parent: Option<Arc<ScopeStorage>>,
}

impl ScopeStorage {
    /// Create new empty storage with no parent.
    ///
    /// Uses 8 shards; scopes hold tens of keys, not thousands.
    #[inline]
    pub fn new() -> Self {
        Self {
            values: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
            parent: None,
        }
    }

    /// Create a child storage that falls back to `parent`.
    #[inline]
    pub fn with_parent(parent: Arc<ScopeStorage>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new()
        }
    }

    /// Insert or overwrite a binding
    #[inline]
    pub fn insert(&self, key: String, value: Value) -> Option<Value> {
        self.values.insert(key, value)
    }

    /// Look up in this storage only
    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up here first, then walk the parent chain.
    #[inline]
    pub fn get_from_chain(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.get(key) {
            return Some(value);
        }

        let mut current = self.parent.as_ref();
        while let Some(storage) = current {
            if let Some(value) = storage.get(key) {
                return Some(value);
            }
            current = storage.parent.as_ref();
        }

        None
    }

    /// Check if key is bound here
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Check if key is bound here or in any parent
    #[inline]
    pub fn contains_in_chain(&self, key: &str) -> bool {
        self.contains(key) || self.parent.as_ref().is_some_and(|p| p.contains_in_chain(key))
    }

    /// Remove a binding from this storage only
    #[inline]
    pub fn remove(&self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Get number of bindings in this storage
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Clear all bindings (preserves parent reference)
    #[inline]
    pub fn clear(&self) {
        self.values.clear();
    }

    /// Get all keys bound in this storage
    pub fn keys(&self) -> Vec<String> {
        self.values.iter().map(|r| r.key().clone()).collect()
    }

    /// Check if this storage has a parent
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

impl std::fmt::Debug for ScopeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeStorage")
            .field("count", &self.len())
            .field("has_parent", &self.has_parent())
            .finish()
    }
}
