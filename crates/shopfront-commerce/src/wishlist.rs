//! Wishlist container.

use crate::catalog::{CatalogPort, CatalogProduct};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use crate::persist::{Persisted, StateRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A saved product reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub name: String,
    /// Price when saved.
    pub unit_price: Money,
    pub image: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    fn from_product(product: CatalogProduct) -> Self {
        Self {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            image: product.image,
            added_at: Utc::now(),
        }
    }
}

/// Persisted wishlist snapshot, at most one entry per product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WishlistState {
    pub entries: Vec<WishlistEntry>,
}

impl WishlistState {
    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|e| &e.product_id == product_id)
    }
}

/// Saved products, independent of the cart.
pub struct WishlistStore {
    state: Persisted<WishlistState>,
    catalog: Arc<dyn CatalogPort>,
}

impl WishlistStore {
    /// Rehydrate the wishlist from `repo`.
    pub fn load(
        repo: Box<dyn StateRepository<WishlistState>>,
        catalog: Arc<dyn CatalogPort>,
    ) -> Result<Self, CommerceError> {
        Ok(Self {
            state: Persisted::load("wishlist", repo)?,
            catalog,
        })
    }

    /// Save a product. Returns `false` without changes if already saved.
    ///
    /// Out-of-stock products may be saved; unknown ids may not.
    pub fn add_item(&mut self, product_id: &ProductId) -> Result<bool, CommerceError> {
        if self.is_in_wishlist(product_id) {
            return Ok(false);
        }
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.clone()))?;
        self.state.update(|list| {
            list.entries.push(WishlistEntry::from_product(product));
            Ok(())
        })?;
        tracing::debug!(product_id = %product_id, "added to wishlist");
        Ok(true)
    }

    /// Delete an entry. Returns whether one was present.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<bool, CommerceError> {
        if !self.is_in_wishlist(product_id) {
            return Ok(false);
        }
        self.state.update(|list| {
            list.entries.retain(|e| &e.product_id != product_id);
            Ok(())
        })?;
        tracing::debug!(product_id = %product_id, "removed from wishlist");
        Ok(true)
    }

    /// Remove an entry and hand it to the caller for cart insertion.
    ///
    /// Absent ids return `NotFound` and change nothing.
    pub fn move_to_cart(&mut self, product_id: &ProductId) -> Result<WishlistEntry, CommerceError> {
        self.take(product_id).map(|(_, entry)| entry)
    }

    /// Remove an entry, returning it with the position it held.
    pub(crate) fn take(
        &mut self,
        product_id: &ProductId,
    ) -> Result<(usize, WishlistEntry), CommerceError> {
        let taken = self.state.update(|list| {
            let index = list
                .position(product_id)
                .ok_or_else(|| CommerceError::not_found("wishlist entry", product_id))?;
            Ok((index, list.entries.remove(index)))
        })?;
        tracing::debug!(product_id = %product_id, "moved out of wishlist");
        Ok(taken)
    }

    /// Put back an entry removed by [`WishlistStore::take`] at its old position.
    pub(crate) fn restore(
        &mut self,
        index: usize,
        entry: WishlistEntry,
    ) -> Result<(), CommerceError> {
        let product_id = entry.product_id.clone();
        self.state.update(|list| {
            if list.position(&entry.product_id).is_none() {
                let index = index.min(list.entries.len());
                list.entries.insert(index, entry);
            }
            Ok(())
        })?;
        tracing::debug!(product_id = %product_id, "restored wishlist entry");
        Ok(())
    }

    /// Check if a product is saved.
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.state.get().position(product_id).is_some()
    }

    /// Number of saved products.
    pub fn count(&self) -> usize {
        self.state.get().entries.len()
    }

    /// Get the entry for a product.
    pub fn get(&self, product_id: &ProductId) -> Option<&WishlistEntry> {
        self.state
            .get()
            .position(product_id)
            .map(|i| &self.state.get().entries[i])
    }

    /// Entries in the order they were saved.
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.state.get().entries
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.state.update(|list| {
            list.entries.clear();
            Ok(())
        })
    }

    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.state.flush()
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, PRODUCT_A, PRODUCT_B, PRODUCT_SOLD_OUT};

    fn wishlist() -> WishlistStore {
        let cache = testing::memory_cache();
        WishlistStore::load(testing::repo(&cache, "wishlist-storage"), testing::catalog()).unwrap()
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut list = wishlist();
        let a = ProductId::new(PRODUCT_A);
        assert!(list.add_item(&a).unwrap());
        assert!(!list.add_item(&a).unwrap());
        assert_eq!(list.count(), 1);
        assert!(list.is_in_wishlist(&a));
    }

    #[test]
    fn test_sold_out_products_can_be_saved() {
        let mut list = wishlist();
        assert!(list.add_item(&ProductId::new(PRODUCT_SOLD_OUT)).unwrap());
        assert!(matches!(
            list.add_item(&ProductId::new("missing")),
            Err(CommerceError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_move_to_cart_is_atomic() {
        let mut list = wishlist();
        let a = ProductId::new(PRODUCT_A);
        let b = ProductId::new(PRODUCT_B);
        list.add_item(&a).unwrap();
        list.add_item(&b).unwrap();

        let entry = list.move_to_cart(&a).unwrap();
        assert_eq!(entry.product_id, a);
        assert!(!list.is_in_wishlist(&a));
        assert_eq!(list.count(), 1);

        let before = list.entries().to_vec();
        assert!(list.move_to_cart(&a).unwrap_err().is_not_found());
        assert_eq!(list.entries(), before.as_slice());
    }

    #[test]
    fn test_restore_keeps_position() {
        let mut list = wishlist();
        let ids: Vec<ProductId> = [PRODUCT_A, PRODUCT_B, PRODUCT_SOLD_OUT]
            .iter()
            .map(|id| ProductId::new(*id))
            .collect();
        for id in &ids {
            list.add_item(id).unwrap();
        }

        let (index, entry) = list.take(&ids[1]).unwrap();
        assert_eq!(index, 1);
        list.restore(index, entry.clone()).unwrap();
        let order: Vec<&ProductId> = list.entries().iter().map(|e| &e.product_id).collect();
        assert_eq!(order, ids.iter().collect::<Vec<_>>());

        // Restoring an entry that is already present changes nothing.
        list.restore(0, entry).unwrap();
        assert_eq!(list.count(), 3);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = wishlist();
        let a = ProductId::new(PRODUCT_A);
        list.add_item(&a).unwrap();
        assert!(list.remove_item(&a).unwrap());
        assert!(!list.remove_item(&a).unwrap());

        list.add_item(&a).unwrap();
        list.add_item(&ProductId::new(PRODUCT_B)).unwrap();
        list.clear().unwrap();
        assert_eq!(list.count(), 0);
    }
}
