//! In-memory key-value store
//!
//! Replaces a global map with an explicitly owned instance.
//!
//! # Design
//!
//! - RwLock: concurrent readers, exclusive writers
//! - FxHashMap: O(1) lookups, fast non-crypto hash
//! - No I/O while the lock is held
//!
//! # Thread Safety
//!
//! All operations take `&self` and are safe to call from any number of
//! threads or tasks. Share the store with `Arc<KeyValueStore>`.

use kvlog_core::{Error, Event, EventKind, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Lock-guarded mapping from key to value
///
/// Last writer wins; there is no versioning.
///
/// # Example
///
/// ```
/// use kvlog_storage::KeyValueStore;
///
/// let store = KeyValueStore::new();
/// store.put("name", "Alice");
/// assert_eq!(store.get("name").unwrap(), "Alice");
/// store.delete("name");
/// assert!(store.get("name").is_err());
/// ```
pub struct KeyValueStore {
    data: RwLock<FxHashMap<String, String>>,
}

impl KeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create a store with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Insert or overwrite a value
    #[inline]
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.data.write().insert(key, value);
    }

    /// Get a value by key
    ///
    /// Fails with [`Error::NoSuchKey`] when the key is absent.
    #[inline]
    pub fn get(&self, key: &str) -> Result<String> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NoSuchKey(key.to_string()))
    }

    /// Remove a key
    ///
    /// Deleting an absent key is not an error.
    #[inline]
    pub fn delete(&self, key: &str) {
        self.data.write().remove(key);
    }

    /// Check if a key exists
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Remove every key
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// Apply a recorded mutation
    ///
    /// Used by replay to rebuild state from the transaction log.
    pub fn apply(&self, event: &Event) {
        match event.kind {
            EventKind::Put => self.put(event.key.as_str(), event.value_str()),
            EventKind::Delete => self.delete(&event.key),
        }
    }

    /// All keys, sorted
    ///
    /// NOTE: collect + sort under a read lock; not for hot paths.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("len", &self.len())
            .finish()
    }
}
