//! The hot cache (C3).
//!
//! An unordered `key -> value` map, read-locked for `get` and
//! write-locked for `insert`/`evict`. Per spec §4.3 it is deliberately
//! unbounded with no eviction policy — its job is to absorb hot-key
//! traffic, not to cap memory.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Thread-safe, unbounded `key -> value` cache.
#[derive(Default)]
pub struct Cache {
    map: RwLock<HashMap<String, String>>,
}

impl Cache {
    /// An empty cache.
    pub fn new() -> Self {
        Cache {
            map: RwLock::new(HashMap::new()),
        }
    }

    /// Look up `key`. Never populates on miss by itself — callers that
    /// want read-through behavior call [`Cache::insert`] after an
    /// index hit (see spec §4.3).
    pub fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    /// Insert-or-replace `key`. Used both for the immediate write-path
    /// update on `Set` and for read-through population on an index
    /// hit.
    pub fn insert(&self, key: String, value: String) {
        self.map.write().insert(key, value);
    }

    /// Evict `key`. Used on `Del` so invariant (2) of spec §3 holds:
    /// the cache never holds a value for a key whose most recent
    /// acknowledged operation was a delete.
    pub fn evict(&self, key: &str) {
        self.map.write().remove(key);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Remove every entry, for `Clear`.
    pub fn clear(&self) {
        self.map.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = Cache::new();
        cache.insert("a".into(), "1".into());
        assert_eq!(cache.get("a"), Some("1".to_string()));
    }

    #[test]
    fn evict_removes_entry() {
        let cache = Cache::new();
        cache.insert("a".into(), "1".into());
        cache.evict("a");
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn miss_returns_none_without_populating() {
        let cache = Cache::new();
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = Cache::new();
        cache.insert("a".into(), "1".into());
        cache.insert("b".into(), "2".into());
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
