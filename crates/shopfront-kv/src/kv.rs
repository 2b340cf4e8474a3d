//! Key-value store wrapper with automatic serialization.

use crate::{KeyValueStore, KvError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Type-safe JSON layer over a [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap: clones share the
/// underlying store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
}

impl Cache {
    /// Wrap a store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::new(Arc::new(FileStore::open("./state")?));
    /// ```
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get a value from the store.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cart: Option<CartState> = cache.get("cart-storage")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set("cart-storage", &cart)?;
    /// ```
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the store.
    pub fn delete(&self, key: &str) -> Result<(), KvError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the store.
    pub fn exists(&self, key: &str) -> Result<bool, KvError> {
        self.store.exists(key)
    }

    /// Get all keys in the store.
    pub fn keys(&self) -> Result<Vec<String>, KvError> {
        self.store.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        product_id: String,
        quantity: u32,
    }

    #[test]
    fn test_typed_roundtrip() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let line = Line {
            product_id: "prod-1".to_string(),
            quantity: 2,
        };

        cache.set("line", &line).unwrap();
        let restored: Option<Line> = cache.get("line").unwrap();
        assert_eq!(restored, Some(line));
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let missing: Option<Line> = cache.get("nothing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_corrupt_value_is_serialize_error() {
        let store = Arc::new(MemoryStore::new());
        store.set("line", b"not json").unwrap();
        let cache = Cache::new(store);

        let result: Result<Option<Line>, KvError> = cache.get("line");
        assert!(matches!(result, Err(KvError::SerializeError(_))));
    }

    #[test]
    fn test_clones_share_store() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let other = cache.clone();
        cache.set("shared", &1u32).unwrap();
        assert!(other.exists("shared").unwrap());
    }
}
