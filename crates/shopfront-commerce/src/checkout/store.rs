//! Order factory and order store.

use crate::cart::{CartState, CouponEvaluator, PriceBreakdown};
use crate::checkout::{CheckoutRequest, Order, OrderLineItem, OrderStatus};
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::ids::{random_token, OrderId, UserId};
use crate::persist::{Persisted, StateRepository};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const TRACKING_PREFIX: &str = "TRK";
const TRACKING_TOKEN_LEN: usize = 10;

/// Persisted orders, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderBook {
    pub orders: Vec<Order>,
}

/// Creates orders from cart snapshots and moves them through their
/// status sequence. Orders are never deleted.
pub struct OrderStore {
    state: Persisted<OrderBook>,
    config: Arc<StoreConfig>,
    coupons: CouponEvaluator,
}

impl OrderStore {
    /// Rehydrate the order history from `repo`.
    pub fn load(
        repo: Box<dyn StateRepository<OrderBook>>,
        config: Arc<StoreConfig>,
    ) -> Result<Self, CommerceError> {
        Ok(Self {
            state: Persisted::load("orders", repo)?,
            coupons: CouponEvaluator::from_config(&config),
            config,
        })
    }

    /// Create a pending order from a cart snapshot.
    ///
    /// Line items are copied, so later cart changes never reach the order.
    /// Fails with `Validation` for an empty cart or incomplete selections and
    /// with `InvalidCouponCode` for a code missing from the coupon table.
    pub fn create_order(
        &mut self,
        cart: &CartState,
        request: CheckoutRequest,
    ) -> Result<Order, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::Validation(
                "cannot place an order with an empty cart".to_string(),
            ));
        }
        request.shipping_address.validate()?;
        request.payment_method.validate()?;

        let coupon = match request.coupon_code.as_deref() {
            Some(code) => Some(
                self.coupons
                    .evaluate(code)
                    .ok_or_else(|| CommerceError::InvalidCouponCode(code.to_string()))?,
            ),
            None => None,
        };

        let line_items = cart
            .lines
            .iter()
            .map(|line| {
                line.line_total()
                    .map(|total| OrderLineItem::from_cart_line(line, total))
                    .ok_or(CommerceError::Overflow)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = cart.subtotal(self.config.currency)?;
        let pricing = PriceBreakdown::compute(
            subtotal,
            request.shipping_speed,
            coupon.as_ref(),
            &self.config,
        )?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user_id: request.user_id,
            line_items,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            shipping_speed: request.shipping_speed,
            subtotal: pricing.subtotal,
            shipping_fee: pricing.shipping_fee,
            tax: pricing.tax,
            discount: pricing.discount,
            total: pricing.total,
            coupon_code: coupon.map(|c| c.code),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            tracking_number: None,
            estimated_delivery: None,
            delivered_at: None,
            cancelled_at: None,
        };

        self.state.update(|book| {
            book.orders.insert(0, order.clone());
            Ok(())
        })?;
        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = order.item_count(),
            "order created"
        );
        Ok(order)
    }

    /// Cancel a pending or processing order.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Result<Order, CommerceError> {
        let order = self.transition(order_id, "cancel", |order| {
            if !order.status.can_cancel() {
                return None;
            }
            let now = Utc::now();
            order.status = OrderStatus::Cancelled;
            order.cancelled_at = Some(now);
            order.updated_at = now;
            Some(())
        })?;
        tracing::info!(order_id = %order_id, "order cancelled");
        Ok(order)
    }

    /// Move an order one step along its status sequence.
    ///
    /// Entering `Shipped` assigns the tracking number and estimated
    /// delivery; entering `Delivered` stamps the delivery time.
    pub fn advance_status(&mut self, order_id: &OrderId) -> Result<Order, CommerceError> {
        let config = Arc::clone(&self.config);
        let order = self.transition(order_id, "advance", |order| {
            let next = order.status.next()?;
            let now = Utc::now();
            match next {
                OrderStatus::Shipped => {
                    let days = config.shipping.rate(order.shipping_speed).delivery_days;
                    order.tracking_number = Some(tracking_number());
                    order.estimated_delivery = Some(now + Duration::days(i64::from(days)));
                }
                OrderStatus::Delivered => order.delivered_at = Some(now),
                _ => {}
            }
            order.status = next;
            order.updated_at = now;
            Some(())
        })?;
        tracing::info!(order_id = %order_id, status = %order.status, "order advanced");
        Ok(order)
    }

    /// Look up an order. `None` is a navigational case, not a failure.
    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.state.get().orders.iter().find(|o| &o.id == order_id)
    }

    /// All orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.state.get().orders
    }

    /// Orders placed by `user_id`, newest first.
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<&Order> {
        self.orders()
            .iter()
            .filter(|o| o.user_id.as_ref() == Some(user_id))
            .collect()
    }

    /// Orders currently in `status`, newest first.
    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders().iter().filter(|o| o.status == status).collect()
    }

    /// Number of orders placed.
    pub fn len(&self) -> usize {
        self.orders().len()
    }

    /// Check if no order was ever placed.
    pub fn is_empty(&self) -> bool {
        self.orders().is_empty()
    }

    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.state.flush()
    }

    /// Apply `step` to an order; `None` from `step` means the current
    /// status does not allow `action`.
    fn transition(
        &mut self,
        order_id: &OrderId,
        action: &'static str,
        step: impl FnOnce(&mut Order) -> Option<()>,
    ) -> Result<Order, CommerceError> {
        self.state.update(|book| {
            let order = book
                .orders
                .iter_mut()
                .find(|o| &o.id == order_id)
                .ok_or_else(|| CommerceError::not_found("order", order_id))?;
            let from = order.status;
            match step(order) {
                Some(()) => Ok(order.clone()),
                None => Err(CommerceError::InvalidTransition {
                    order_id: order_id.clone(),
                    from,
                    action,
                }),
            }
        })
    }
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("orders", &self.len())
            .finish_non_exhaustive()
    }
}

fn tracking_number() -> String {
    format!("{TRACKING_PREFIX}{}", random_token(TRACKING_TOKEN_LEN))
}
