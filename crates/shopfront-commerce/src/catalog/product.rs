//! Catalog lookup port and the in-memory catalog.

use crate::catalog::InventoryLevel;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Stock status reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

/// Current catalog view of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Money,
    /// Primary image URL.
    pub image: Option<String>,
    /// Stock status.
    pub stock: StockStatus,
    /// Quantity available for purchase.
    pub stock_quantity: i64,
}

impl CatalogProduct {
    /// Hard out-of-stock: either flagged so, or nothing left to sell.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == StockStatus::OutOfStock || self.stock_quantity <= 0
    }

    /// Quantity the cart may hold, never negative.
    pub fn available(&self) -> i64 {
        self.stock_quantity.max(0)
    }
}

/// Read-only product lookup consulted synchronously by the cart.
///
/// Every call reflects stock at call time; callers must not cache results
/// across operations.
pub trait CatalogPort: Send + Sync {
    /// Look up a product by id.
    fn product(&self, id: &ProductId) -> Option<CatalogProduct>;
}

/// Product data for the in-memory catalog, without stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image: Option<String>,
}

impl ProductListing {
    /// Create a listing with no image.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
        }
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    listing: ProductListing,
    inventory: InventoryLevel,
}

/// In-memory catalog with mutable stock.
///
/// Stock status is derived from the inventory level using the catalog's
/// low-stock threshold.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entries: RwLock<HashMap<ProductId, CatalogEntry>>,
    low_stock_threshold: i64,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new(low_stock_threshold: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            low_stock_threshold,
        }
    }

    /// Builder-style insert.
    pub fn with_product(self, listing: ProductListing, quantity: i64) -> Self {
        self.insert(listing, quantity);
        self
    }

    /// Insert or replace a product.
    pub fn insert(&self, listing: ProductListing, quantity: i64) {
        let inventory =
            InventoryLevel::new(quantity).with_low_stock_threshold(self.low_stock_threshold);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(listing.id.clone(), CatalogEntry { listing, inventory });
    }

    /// Set the stock quantity. Returns `false` for unknown products.
    pub fn set_quantity(&self, id: &ProductId, quantity: i64) -> bool {
        self.with_inventory(id, |inv| inv.set(quantity))
    }

    /// Add stock. Returns `false` for unknown products.
    pub fn restock(&self, id: &ProductId, quantity: i64) -> bool {
        self.with_inventory(id, |inv| inv.restock(quantity))
    }

    /// Remove a product from the catalog.
    pub fn remove(&self, id: &ProductId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(id).is_some()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_inventory(&self, id: &ProductId, f: impl FnOnce(&mut InventoryLevel)) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get_mut(id) {
            Some(entry) => {
                f(&mut entry.inventory);
                true
            }
            None => false,
        }
    }
}

impl CatalogPort for StaticCatalog {
    fn product(&self, id: &ProductId) -> Option<CatalogProduct> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).map(|entry| CatalogProduct {
            id: entry.listing.id.clone(),
            name: entry.listing.name.clone(),
            price: entry.listing.price,
            image: entry.listing.image.clone(),
            stock: entry.inventory.status(),
            stock_quantity: entry.inventory.available(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(2)
            .with_product(
                ProductListing::new("kettle", "Kettle", Money::from_major(900, Currency::INR))
                    .with_image("/img/kettle.jpg"),
                10,
            )
            .with_product(
                ProductListing::new("mug", "Mug", Money::from_major(150, Currency::INR)),
                2,
            )
    }

    #[test]
    fn test_lookup_reports_current_stock() {
        let catalog = catalog();
        let kettle = catalog.product(&ProductId::new("kettle")).unwrap();
        assert_eq!(kettle.stock, StockStatus::InStock);
        assert_eq!(kettle.stock_quantity, 10);
        assert_eq!(kettle.image.as_deref(), Some("/img/kettle.jpg"));

        let mug = catalog.product(&ProductId::new("mug")).unwrap();
        assert_eq!(mug.stock, StockStatus::LowStock);
    }

    #[test]
    fn test_unknown_product_is_none() {
        assert!(catalog().product(&ProductId::new("nope")).is_none());
    }

    #[test]
    fn test_stock_changes_are_visible_immediately() {
        let catalog = catalog();
        let id = ProductId::new("mug");

        assert!(catalog.set_quantity(&id, 0));
        let mug = catalog.product(&id).unwrap();
        assert_eq!(mug.stock, StockStatus::OutOfStock);
        assert!(mug.is_out_of_stock());

        assert!(catalog.restock(&id, 7));
        assert_eq!(catalog.product(&id).unwrap().stock_quantity, 7);
        assert!(!catalog.restock(&ProductId::new("nope"), 1));
    }

    #[test]
    fn test_flagged_out_of_stock_overrides_quantity() {
        let product = CatalogProduct {
            id: ProductId::new("x"),
            name: "X".to_string(),
            price: Money::from_major(1, Currency::INR),
            image: None,
            stock: StockStatus::OutOfStock,
            stock_quantity: 4,
        };
        assert!(product.is_out_of_stock());
    }
}
