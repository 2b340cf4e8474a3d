//! Shared test fixtures.

use crate::cart::CartStore;
use crate::catalog::{ProductListing, StaticCatalog};
use crate::checkout::Address;
use crate::config::StoreConfig;
use crate::money::{Currency, Money};
use crate::persist::StateRepository;
use crate::storefront::Storefront;
use serde::{de::DeserializeOwned, Serialize};
use shopfront_kv::{Cache, MemoryStore, SessionId, StateSlot};
use std::sync::Arc;

/// Price 50.00, stock 3.
pub(crate) const PRODUCT_A: &str = "prod-a";
/// Price 1000.00, stock 10.
pub(crate) const PRODUCT_B: &str = "prod-b";
/// Price 200.00, stock 2.
pub(crate) const PRODUCT_LOW: &str = "prod-low";
/// Price 300.00, stock 0.
pub(crate) const PRODUCT_SOLD_OUT: &str = "prod-sold-out";

pub(crate) fn catalog() -> Arc<StaticCatalog> {
    let inr = |major| Money::from_major(major, Currency::INR);
    Arc::new(
        StaticCatalog::new(StoreConfig::default().low_stock_threshold)
            .with_product(
                ProductListing::new(PRODUCT_A, "Steel Water Bottle", inr(50))
                    .with_image("/images/bottle.jpg"),
                3,
            )
            .with_product(ProductListing::new(PRODUCT_B, "Denim Jacket", inr(1000)), 10)
            .with_product(ProductListing::new(PRODUCT_LOW, "Desk Lamp", inr(200)), 2)
            .with_product(ProductListing::new(PRODUCT_SOLD_OUT, "Wool Scarf", inr(300)), 0),
    )
}

pub(crate) fn memory_cache() -> Cache {
    Cache::new(Arc::new(MemoryStore::new()))
}

pub(crate) fn repo<S>(cache: &Cache, key: &str) -> Box<dyn StateRepository<S>>
where
    S: Serialize + DeserializeOwned + 'static,
{
    Box::new(StateSlot::<S>::new(cache.clone(), key))
}

pub(crate) fn cart_store(catalog: Arc<StaticCatalog>) -> CartStore {
    CartStore::load(repo(&memory_cache(), "cart-storage"), catalog, Currency::INR)
        .expect("memory-backed cart loads")
}

pub(crate) fn address(label: &str) -> Address {
    Address::new(
        label,
        "Asha Rao",
        "+91 98450 00000",
        "12 MG Road",
        "Bengaluru",
        "Karnataka",
        "560001",
        "India",
    )
}

/// In-memory storefront over [`catalog`], plus the catalog handle for
/// changing stock mid-test.
pub(crate) fn storefront() -> (Storefront, Arc<StaticCatalog>) {
    let catalog = catalog();
    let storefront = Storefront::open(
        StoreConfig::default(),
        catalog.clone(),
        Arc::new(MemoryStore::new()),
        SessionId::new("sess_test"),
    )
    .expect("memory-backed storefront opens");
    (storefront, catalog)
}
