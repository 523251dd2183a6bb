//! Key-value storage port.
//!
//! The session persists string blobs (JSON) under fixed keys. Any backend
//! that can get, put and remove strings can host it; [`MemoryStore`] is the
//! in-process implementation used by the replay driver and tests.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use batball_types::{BatballError, Result};

/// Storage port for persisted session data.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: String) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared in-memory store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> BatballError {
    BatballError::Store("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_data() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.put("k", "1".to_string()).unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("1"));
        assert_eq!(b.len(), 1);
    }
}
