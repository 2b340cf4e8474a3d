//! Commerce error types.

use crate::checkout::OrderStatus;
use crate::ids::{OrderId, ProductId};
use crate::money::Currency;
use shopfront_kv::KvError;
use thiserror::Error;

/// Hard failures of storefront operations.
///
/// A hard failure leaves container state unchanged. Stock shortfalls that
/// still let an operation succeed at a reduced quantity are not errors; they
/// are reported as [`crate::cart::StockWarning`] inside the successful
/// outcome.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product id unknown to the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Product has zero available stock.
    #[error("Product is out of stock: {0}")]
    OutOfStock(ProductId),

    /// Order status change not allowed from the current status.
    #[error("Cannot {action} order {order_id} while it is {from}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        action: &'static str,
    },

    /// Lookup miss for an order, address, review, cart line or wishlist entry.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Coupon code not present in the coupon table.
    #[error("Invalid coupon code: {0}")]
    InvalidCouponCode(String),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Price in a different currency than the store.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: Currency, got: Currency },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Persisting or rehydrating a container failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CommerceError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CommerceError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this is a lookup miss that callers should turn into a
    /// redirect to a listing page rather than an error screen.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::NotFound { .. } | CommerceError::ProductNotFound(_)
        )
    }
}
