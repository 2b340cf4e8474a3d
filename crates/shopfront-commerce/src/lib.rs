//! Storefront state core for Shopfront.
//!
//! This crate holds the shopper-side state of a storefront as explicit,
//! persisted containers:
//!
//! - **Cart**: stock-aware line items, coupon evaluation, pricing
//! - **Wishlist**: saved products with move-to-cart
//! - **Checkout**: orders and their status sequence, saved addresses
//! - **Reviews**: per-product reviews with one helpfulness vote per session
//!
//! Stock and prices come from a [`catalog::CatalogPort`]; each container
//! persists its whole snapshot through a [`persist::StateRepository`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_commerce::prelude::*;
//! use shopfront_kv::{MemoryStore, SessionId};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(StaticCatalog::new(5).with_product(
//!     ProductListing::new("bottle", "Steel Bottle", Money::from_major(50, Currency::INR)),
//!     3,
//! ));
//! let mut shop = Storefront::open(
//!     StoreConfig::default(),
//!     catalog,
//!     Arc::new(MemoryStore::new()),
//!     SessionId::generate(),
//! )?;
//!
//! let change = shop.cart_mut().add_item(&ProductId::new("bottle"), 5, None)?;
//! if let Some(warning) = change.warning() {
//!     println!("{warning}");
//! }
//! let order = shop.checkout(CheckoutRequest::new(address, PaymentMethod::CashOnDelivery))?;
//! println!("Total: {}", order.total.display());
//! shop.close()?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod persist;
pub mod reviews;
pub mod storefront;
pub mod wishlist;

#[cfg(test)]
mod testing;

pub use config::StoreConfig;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use storefront::{ReorderLine, Storefront};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ShippingPolicy, ShippingRate, StorageKeys, StoreConfig};
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::persist::StateRepository;
    pub use crate::storefront::{ReorderLine, Storefront};

    // Catalog
    pub use crate::catalog::{
        CatalogPort, CatalogProduct, InventoryLevel, ProductListing, StaticCatalog, StockStatus,
    };

    // Cart
    pub use crate::cart::{
        CartChange, CartLine, CartState, CartStore, CouponDefinition, CouponDescriptor,
        CouponEvaluator, CouponKind, PriceBreakdown, StockWarning,
    };

    // Checkout
    pub use crate::checkout::{
        Address, AddressBook, CheckoutRequest, Order, OrderLineItem, OrderStatus, OrderStore,
        PaymentMethod, ShippingSpeed,
    };

    // Wishlist and reviews
    pub use crate::reviews::{Review, ReviewInput, ReviewSort, ReviewStore};
    pub use crate::wishlist::{WishlistEntry, WishlistStore};
}
