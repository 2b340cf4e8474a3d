//! Cart container.

use crate::cart::{CouponDescriptor, PriceBreakdown};
use crate::catalog::{CatalogPort, CatalogProduct};
use crate::checkout::ShippingSpeed;
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::persist::{Persisted, StateRepository};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One product in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product identifier; at most one line per product.
    pub product_id: ProductId,
    /// Product name at time of first add.
    pub name: String,
    /// Unit price snapshot at time of first add.
    pub unit_price: Money,
    /// Always positive and within the stock available when last changed.
    pub quantity: i64,
    /// Product image URL.
    pub image: Option<String>,
    /// Selected variant (size, colour) if any.
    pub variant: Option<String>,
}

impl CartLine {
    fn from_product(product: &CatalogProduct, quantity: i64, variant: Option<String>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
            variant,
        }
    }

    /// `unit_price * quantity`, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// Persisted cart snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CartState {
    pub lines: Vec<CartLine>,
}

impl CartState {
    /// Find the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Sum of line totals.
    pub fn subtotal(&self, currency: Currency) -> Result<Money, CommerceError> {
        let totals = self
            .lines
            .iter()
            .map(|l| l.line_total().ok_or(CommerceError::Overflow))
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(totals.iter(), currency).ok_or(CommerceError::Overflow)
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() != before
    }
}

/// Requested quantity exceeded what the catalog can supply.
///
/// This is a soft signal: the operation succeeded at `available`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockWarning {
    pub product_id: ProductId,
    /// Quantity the caller asked the line to hold.
    pub requested: i64,
    /// Quantity the line was capped at.
    pub available: i64,
}

impl fmt::Display for StockWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "only {} of {} available, requested {}",
            self.available, self.product_id, self.requested
        )
    }
}

/// Outcome of a successful cart mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CartChange {
    /// Line now holds exactly the requested quantity.
    Updated { product_id: ProductId, quantity: i64 },
    /// Line was capped at the available stock.
    Capped {
        product_id: ProductId,
        quantity: i64,
        warning: StockWarning,
    },
    /// Line was removed (requested quantity resolved to zero or below).
    Removed { product_id: ProductId },
}

impl CartChange {
    /// Product the change applied to.
    pub fn product_id(&self) -> &ProductId {
        match self {
            CartChange::Updated { product_id, .. }
            | CartChange::Capped { product_id, .. }
            | CartChange::Removed { product_id } => product_id,
        }
    }

    /// Quantity the line holds afterwards, `0` when removed.
    pub fn quantity(&self) -> i64 {
        match self {
            CartChange::Updated { quantity, .. } | CartChange::Capped { quantity, .. } => {
                *quantity
            }
            CartChange::Removed { .. } => 0,
        }
    }

    /// The soft stock warning, if the change was capped.
    pub fn warning(&self) -> Option<&StockWarning> {
        match self {
            CartChange::Capped { warning, .. } => Some(warning),
            _ => None,
        }
    }

    /// Check if the requested quantity was reduced to available stock.
    pub fn is_capped(&self) -> bool {
        self.warning().is_some()
    }
}

/// Stock-aware cart.
///
/// Every quantity-setting mutation re-reads the product from the catalog, so
/// a line never holds more than the stock available at the time of the
/// mutation. Lines are keyed by product id; a second add of the same product
/// adds to the existing line and keeps its price snapshot.
pub struct CartStore {
    state: Persisted<CartState>,
    catalog: Arc<dyn CatalogPort>,
    currency: Currency,
}

impl CartStore {
    /// Rehydrate the cart from `repo`.
    pub fn load(
        repo: Box<dyn StateRepository<CartState>>,
        catalog: Arc<dyn CatalogPort>,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        Ok(Self {
            state: Persisted::load("cart", repo)?,
            catalog,
            currency,
        })
    }

    /// Add `quantity` of a product, capped at available stock.
    ///
    /// Fails with `ProductNotFound` for unknown ids and `OutOfStock` when
    /// nothing is available. `variant`, when given, replaces the line's
    /// selected variant.
    pub fn add_item(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
        variant: Option<String>,
    ) -> Result<CartChange, CommerceError> {
        let product = self.lookup(product_id)?;
        let change = self.state.update(|cart| {
            let existing = cart.line(product_id).map_or(0, |l| l.quantity);
            let requested = existing
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            Ok(apply_quantity(cart, &product, requested, variant))
        })?;
        log_change("add", &change);
        Ok(change)
    }

    /// Set a line's quantity, capped at available stock.
    ///
    /// A quantity of zero or below removes the line. Otherwise the line must
    /// already exist.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartChange, CommerceError> {
        if quantity <= 0 {
            self.remove_item(product_id)?;
            return Ok(CartChange::Removed {
                product_id: product_id.clone(),
            });
        }
        if !self.contains(product_id) {
            return Err(CommerceError::not_found("cart line", product_id));
        }
        let product = self.lookup(product_id)?;
        let change = self
            .state
            .update(|cart| Ok(apply_quantity(cart, &product, quantity, None)))?;
        log_change("update", &change);
        Ok(change)
    }

    /// Remove a product's line. Returns whether a line was present.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<bool, CommerceError> {
        if !self.contains(product_id) {
            return Ok(false);
        }
        self.state.update(|cart| Ok(cart.remove(product_id)))?;
        tracing::debug!(product_id = %product_id, "removed cart line");
        Ok(true)
    }

    /// Remove every line.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.state.update(|cart| {
            cart.lines.clear();
            Ok(())
        })?;
        tracing::debug!("cleared cart");
        Ok(())
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.state.get().subtotal(self.currency)
    }

    /// Sum of quantities across lines.
    pub fn item_count(&self) -> i64 {
        self.state.get().item_count()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.state.get().lines.len()
    }

    /// Find the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.state.get().line(product_id)
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.state.get().lines
    }

    /// Check if a product has a line.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.state.get().is_empty()
    }

    /// Current state, borrowed.
    pub fn state(&self) -> &CartState {
        self.state.get()
    }

    /// Owned copy of the current state, detached from later mutations.
    pub fn snapshot(&self) -> CartState {
        self.state.get().clone()
    }

    /// Checkout preview, priced exactly as an order would be.
    pub fn quote(
        &self,
        config: &StoreConfig,
        speed: ShippingSpeed,
        coupon: Option<&CouponDescriptor>,
    ) -> Result<PriceBreakdown, CommerceError> {
        PriceBreakdown::compute(self.total()?, speed, coupon, config)
    }

    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.state.flush()
    }

    fn lookup(&self, product_id: &ProductId) -> Result<CatalogProduct, CommerceError> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.clone()))?;
        if product.is_out_of_stock() {
            return Err(CommerceError::OutOfStock(product_id.clone()));
        }
        if product.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency,
                got: product.price.currency,
            });
        }
        Ok(product)
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

/// Make the product's line hold `requested`, capped at available stock.
fn apply_quantity(
    cart: &mut CartState,
    product: &CatalogProduct,
    requested: i64,
    variant: Option<String>,
) -> CartChange {
    let product_id = product.id.clone();
    if requested <= 0 {
        cart.remove(&product_id);
        return CartChange::Removed { product_id };
    }

    let available = product.available();
    let quantity = requested.min(available);

    match cart.lines.iter_mut().find(|l| l.product_id == product_id) {
        Some(line) => {
            line.quantity = quantity;
            if variant.is_some() {
                line.variant = variant;
            }
        }
        None => cart
            .lines
            .push(CartLine::from_product(product, quantity, variant)),
    }

    if requested > available {
        CartChange::Capped {
            warning: StockWarning {
                product_id: product_id.clone(),
                requested,
                available,
            },
            product_id,
            quantity,
        }
    } else {
        CartChange::Updated {
            product_id,
            quantity,
        }
    }
}

fn log_change(op: &'static str, change: &CartChange) {
    match change.warning() {
        Some(w) => tracing::warn!(
            op,
            product_id = %w.product_id,
            requested = w.requested,
            available = w.available,
            "cart quantity capped at available stock"
        ),
        None => tracing::debug!(
            op,
            product_id = %change.product_id(),
            quantity = change.quantity(),
            "cart line changed"
        ),
    }
}
