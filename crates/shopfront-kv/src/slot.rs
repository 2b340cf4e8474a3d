//! Whole-snapshot persistence under a single key.

use crate::{Cache, KvError};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Envelope written for every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredState<T> {
    /// Incremented on every save.
    pub version: u64,
    /// When this snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The container state.
    pub state: T,
}

#[derive(Serialize)]
struct StoredStateRef<'a, T> {
    version: u64,
    saved_at: DateTime<Utc>,
    state: &'a T,
}

/// One container snapshot persisted under one named key.
///
/// Persistence is wholesale: `save` replaces the entire snapshot, `load`
/// rehydrates it. There is no partial or incremental write.
///
/// # Example
///
/// ```rust,ignore
/// let slot = StateSlot::<CartState>::new(cache, "cart-storage");
/// let cart = slot.load()?.unwrap_or_default();
/// slot.save(&cart)?;
/// ```
pub struct StateSlot<T> {
    cache: Cache,
    key: String,
    version: AtomicU64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> StateSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a slot to `key` in `cache`.
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            version: AtomicU64::new(0),
            _phantom: PhantomData,
        }
    }

    /// The storage key of this slot.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Version of the last snapshot loaded or saved through this slot.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Load the snapshot including its envelope.
    pub fn load_versioned(&self) -> Result<Option<StoredState<T>>, KvError> {
        let stored = self.cache.get::<StoredState<T>>(&self.key)?;
        if let Some(ref s) = stored {
            self.version.store(s.version, Ordering::SeqCst);
            tracing::debug!(key = %self.key, version = s.version, "rehydrated snapshot");
        }
        Ok(stored)
    }

    /// Load the snapshot, or `None` if nothing was ever saved.
    pub fn load(&self) -> Result<Option<T>, KvError> {
        Ok(self.load_versioned()?.map(|s| s.state))
    }

    /// Replace the persisted snapshot. Returns the new version.
    pub fn save(&self, state: &T) -> Result<u64, KvError> {
        let version = self.version.load(Ordering::SeqCst) + 1;
        let envelope = StoredStateRef {
            version,
            saved_at: Utc::now(),
            state,
        };
        self.cache.set(&self.key, &envelope)?;
        self.version.store(version, Ordering::SeqCst);
        tracing::trace!(key = %self.key, version, "saved snapshot");
        Ok(version)
    }

    /// Delete the persisted snapshot.
    pub fn clear(&self) -> Result<(), KvError> {
        self.cache.delete(&self.key)?;
        self.version.store(0, Ordering::SeqCst);
        Ok(())
    }
}

impl<T> std::fmt::Debug for StateSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSlot")
            .field("key", &self.key)
            .field("version", &self.version.load(Ordering::SeqCst))
            .finish()
    }
}
