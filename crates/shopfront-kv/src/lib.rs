//! Typed JSON key-value persistence for Shopfront.
//!
//! Each storefront container (cart, wishlist, reviews, orders, addresses)
//! persists its whole state snapshot under one named key. This crate provides
//! the storage media and the typed layer on top of them:
//!
//! - [`KeyValueStore`]: raw byte storage, with [`MemoryStore`] and [`FileStore`]
//! - [`Cache`]: automatic JSON serialization over any store
//! - [`StateSlot`]: one versioned snapshot under one key
//! - [`SessionId`]: identity of the browsing session
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_kv::{Cache, MemoryStore, StateSlot};
//! use std::sync::Arc;
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//! let slot = StateSlot::<Vec<String>>::new(cache, "wishlist-storage");
//!
//! slot.save(&vec!["prod-1".to_string()])?;
//! let restored = slot.load()?;
//! ```

mod error;
mod kv;
mod session;
mod slot;
mod store;

pub use error::KvError;
pub use kv::Cache;
pub use session::SessionId;
pub use slot::{StateSlot, StoredState};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Cache, FileStore, KeyValueStore, KvError, MemoryStore, SessionId, StateSlot, StoredState,
    };
}
