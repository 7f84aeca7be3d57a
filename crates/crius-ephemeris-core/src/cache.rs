//! Cache-provider capability consumed by [`crate::CachedEphemerisService`].

use crate::types::LayerPositions;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key-value store for computed layer positions.
///
/// Methods take `&self`; implementations choose their own locking. Nothing
/// here coalesces concurrent requests for the same key.
pub trait CacheProvider {
    /// Get cached value by key
    fn get(&self, key: &str) -> Option<LayerPositions>;

    /// Store a value under `key`, replacing any previous entry
    fn set(&self, key: &str, value: LayerPositions);

    /// Drop every cached value
    fn clear(&self);
}

impl<C: CacheProvider + ?Sized> CacheProvider for &C {
    fn get(&self, key: &str) -> Option<LayerPositions> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: LayerPositions) {
        (**self).set(key, value)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl<C: CacheProvider + ?Sized> CacheProvider for Box<C> {
    fn get(&self, key: &str) -> Option<LayerPositions> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: LayerPositions) {
        (**self).set(key, value)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl<C: CacheProvider + ?Sized> CacheProvider for Arc<C> {
    fn get(&self, key: &str) -> Option<LayerPositions> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: LayerPositions) {
        (**self).set(key, value)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// In-memory cache backed by a `HashMap` behind a `RwLock`.
///
/// Unbounded. A poisoned lock reads as a miss and drops writes.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, LayerPositions>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl CacheProvider for InMemoryCache {
    fn get(&self, key: &str) -> Option<LayerPositions> {
        match self.entries.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                log::warn!(
                    "InMemoryCache: read lock poisoned, treating '{}' as a miss: {}",
                    key,
                    e
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: LayerPositions) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.to_owned(), value);
            }
            Err(e) => log::warn!("InMemoryCache: write lock poisoned, dropping '{}': {}", key, e),
        }
    }

    fn clear(&self) {
        match self.entries.write() {
            Ok(mut entries) => entries.clear(),
            Err(e) => log::warn!("InMemoryCache: write lock poisoned, not cleared: {}", e),
        }
    }
}
