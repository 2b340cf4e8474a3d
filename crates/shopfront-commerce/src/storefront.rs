//! Storefront session.
//!
//! A [`Storefront`] owns one instance of every container, wired to a shared
//! catalog and key-value store. It is constructed explicitly at session
//! start and torn down with [`Storefront::close`]; there is no global state.
//! Callers that share a session across threads wrap it in a `Mutex`, which
//! keeps the single-writer discipline every container assumes.

use crate::cart::{
    CartChange, CartState, CartStore, CouponDescriptor, CouponEvaluator, PriceBreakdown,
};
use crate::catalog::CatalogPort;
use crate::checkout::{
    AddressBook, AddressBookState, CheckoutRequest, Order, OrderBook, OrderStore, ShippingSpeed,
};
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId};
use crate::persist::StateRepository;
use crate::reviews::{ReviewState, ReviewStore};
use crate::wishlist::{WishlistState, WishlistStore};
use serde::{de::DeserializeOwned, Serialize};
use shopfront_kv::{Cache, KeyValueStore, SessionId, StateSlot};
use std::sync::Arc;

/// Outcome of re-adding one line of a past order.
#[derive(Debug)]
pub struct ReorderLine {
    pub product_id: ProductId,
    /// Quantity the past order held.
    pub ordered: i64,
    /// Cart outcome under current stock; lines fail independently.
    pub outcome: Result<CartChange, CommerceError>,
}

impl ReorderLine {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// One shopper session over all storefront containers.
pub struct Storefront {
    config: Arc<StoreConfig>,
    session_id: SessionId,
    coupons: CouponEvaluator,
    cart: CartStore,
    wishlist: WishlistStore,
    orders: OrderStore,
    reviews: ReviewStore,
    addresses: AddressBook,
}

impl Storefront {
    /// Validate `config` and rehydrate every container from `store`.
    ///
    /// Containers with no saved snapshot start empty.
    pub fn open(
        config: StoreConfig,
        catalog: Arc<dyn CatalogPort>,
        store: Arc<dyn KeyValueStore>,
        session_id: SessionId,
    ) -> Result<Self, CommerceError> {
        config.validate()?;
        let config = Arc::new(config);
        let cache = Cache::new(store);
        let keys = &config.storage;

        let storefront = Self {
            coupons: CouponEvaluator::from_config(&config),
            cart: CartStore::load(
                slot::<CartState>(&cache, &keys.cart),
                Arc::clone(&catalog),
                config.currency,
            )?,
            wishlist: WishlistStore::load(slot::<WishlistState>(&cache, &keys.wishlist), catalog)?,
            orders: OrderStore::load(slot::<OrderBook>(&cache, &keys.orders), Arc::clone(&config))?,
            reviews: ReviewStore::load(
                slot::<ReviewState>(&cache, &keys.reviews),
                session_id.clone(),
            )?,
            addresses: AddressBook::load(slot::<AddressBookState>(&cache, &keys.addresses))?,
            session_id,
            config,
        };

        tracing::info!(
            session_id = %storefront.session_id,
            cart_lines = storefront.cart.line_count(),
            wishlist = storefront.wishlist.count(),
            orders = storefront.orders.len(),
            "storefront session opened"
        );
        Ok(storefront)
    }

    /// Flush every container snapshot and end the session.
    pub fn close(self) -> Result<(), CommerceError> {
        self.cart.flush()?;
        self.wishlist.flush()?;
        self.orders.flush()?;
        self.reviews.flush()?;
        self.addresses.flush()?;
        tracing::info!(session_id = %self.session_id, "storefront session closed");
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut OrderStore {
        &mut self.orders
    }

    pub fn reviews(&self) -> &ReviewStore {
        &self.reviews
    }

    pub fn reviews_mut(&mut self) -> &mut ReviewStore {
        &mut self.reviews
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    pub fn addresses_mut(&mut self) -> &mut AddressBook {
        &mut self.addresses
    }

    /// Resolve a coupon code against the configured table.
    pub fn evaluate_coupon(&self, code: &str) -> Option<CouponDescriptor> {
        self.coupons.evaluate(code)
    }

    /// Price the live cart as checkout would.
    pub fn quote(
        &self,
        speed: ShippingSpeed,
        coupon_code: Option<&str>,
    ) -> Result<PriceBreakdown, CommerceError> {
        let coupon = coupon_code
            .map(|code| {
                self.evaluate_coupon(code)
                    .ok_or_else(|| CommerceError::InvalidCouponCode(code.to_string()))
            })
            .transpose()?;
        self.cart.quote(&self.config, speed, coupon.as_ref())
    }

    /// Add one unit of a saved product to the cart and drop it from the
    /// wishlist.
    ///
    /// The entry is taken out first and put back at its old position if the
    /// cart rejects the product or fails to save, so the product never ends
    /// up in both containers. A soft stock cap still counts as accepted.
    pub fn move_wishlist_item_to_cart(
        &mut self,
        product_id: &ProductId,
    ) -> Result<CartChange, CommerceError> {
        let (index, entry) = self.wishlist.take(product_id)?;
        match self.cart.add_item(product_id, 1, None) {
            Ok(change) => Ok(change),
            Err(e) => {
                if let Err(restore_err) = self.wishlist.restore(index, entry) {
                    tracing::error!(
                        product_id = %product_id,
                        error = %restore_err,
                        "failed to restore wishlist entry after cart rejection"
                    );
                }
                Err(e)
            }
        }
    }

    /// Place an order from the live cart, then empty the cart.
    ///
    /// The cart is cleared only after the order is persisted. A failure to
    /// clear it afterwards does not undo the order.
    pub fn checkout(&mut self, request: CheckoutRequest) -> Result<Order, CommerceError> {
        let order = self.orders.create_order(self.cart.state(), request)?;
        if let Err(e) = self.cart.clear() {
            tracing::error!(order_id = %order.id, error = %e, "order placed but cart not cleared");
        }
        Ok(order)
    }

    /// Re-add every line of a past order under current stock.
    ///
    /// Each line is validated independently; one failing line does not stop
    /// the others.
    pub fn reorder(&mut self, order_id: &OrderId) -> Result<Vec<ReorderLine>, CommerceError> {
        let items = self
            .orders
            .get_order(order_id)
            .ok_or_else(|| CommerceError::not_found("order", order_id))?
            .line_items
            .clone();

        let lines: Vec<ReorderLine> = items
            .into_iter()
            .map(|item| ReorderLine {
                outcome: self
                    .cart
                    .add_item(&item.product_id, item.quantity, item.variant),
                product_id: item.product_id,
                ordered: item.quantity,
            })
            .collect();

        let failed = lines.iter().filter(|l| !l.is_ok()).count();
        tracing::info!(order_id = %order_id, lines = lines.len(), failed, "reordered");
        Ok(lines)
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("session_id", &self.session_id)
            .field("cart", &self.cart)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

fn slot<S>(cache: &Cache, key: &str) -> Box<dyn StateRepository<S>>
where
    S: Serialize + DeserializeOwned + 'static,
{
    Box::new(StateSlot::<S>::new(cache.clone(), key))
}
