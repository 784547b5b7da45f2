//! In-memory store implementation for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::store::LocalStore;
use crate::Result;

/// In-memory key-value store.
///
/// Provides the same interface as the file-backed implementation without
/// touching the filesystem. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let store = InMemoryStore::new();
        assert!(store.get("cart").unwrap().is_none());

        store.put("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);

        store.remove("cart").unwrap();
        assert!(store.get("cart").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_key_is_ok() {
        let store = InMemoryStore::new();
        store.remove("missing").unwrap();
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.put("user", "{}").unwrap();
        assert_eq!(other.get("user").unwrap().as_deref(), Some("{}"));
    }
}
