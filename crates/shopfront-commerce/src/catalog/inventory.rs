//! Inventory tracking types.

use crate::catalog::StockStatus;
use serde::{Deserialize, Serialize};

/// Inventory level for a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InventoryLevel {
    /// Quantity on hand.
    pub quantity: i64,
    /// Low stock threshold; `None` never reports low stock.
    pub low_stock_threshold: Option<i64>,
}

impl InventoryLevel {
    /// Create an inventory level with no low-stock threshold.
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            low_stock_threshold: None,
        }
    }

    /// Set the low stock threshold.
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    /// Quantity that can be put in a cart, never negative.
    pub fn available(&self) -> i64 {
        self.quantity.max(0)
    }

    /// Check if stock is at or below the low stock threshold.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .map(|threshold| self.available() > 0 && self.available() <= threshold)
            .unwrap_or(false)
    }

    /// Check if out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.available() == 0
    }

    /// Stock status derived from the quantity.
    pub fn status(&self) -> StockStatus {
        if self.is_out_of_stock() {
            StockStatus::OutOfStock
        } else if self.is_low_stock() {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Add inventory (restock).
    pub fn restock(&mut self, quantity: i64) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// Set the quantity outright (correction).
    pub fn set(&mut self, quantity: i64) {
        self.quantity = quantity.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_derivation() {
        let inv = InventoryLevel::new(10).with_low_stock_threshold(3);
        assert_eq!(inv.status(), StockStatus::InStock);

        let inv = InventoryLevel::new(3).with_low_stock_threshold(3);
        assert_eq!(inv.status(), StockStatus::LowStock);

        let inv = InventoryLevel::new(0).with_low_stock_threshold(3);
        assert_eq!(inv.status(), StockStatus::OutOfStock);
    }

    #[test]
    fn test_negative_quantity_is_out_of_stock() {
        let inv = InventoryLevel::new(-2);
        assert_eq!(inv.available(), 0);
        assert!(inv.is_out_of_stock());
    }

    #[test]
    fn test_restock_and_set() {
        let mut inv = InventoryLevel::new(0);
        inv.restock(4);
        assert_eq!(inv.available(), 4);
        inv.set(-1);
        assert_eq!(inv.quantity, 0);
    }
}
