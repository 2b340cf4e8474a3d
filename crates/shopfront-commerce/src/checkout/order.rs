//! Order types.

use crate::cart::CartLine;
use crate::checkout::{Address, PaymentMethod, ShippingSpeed};
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// `Pending -> Processing -> Shipped -> Delivered`, with `Cancelled`
/// reachable from `Pending` or `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Next status along the forward sequence, `None` when terminal.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item copied from the cart at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    /// Product name at time of order.
    pub name: String,
    /// Unit price at time of order.
    pub unit_price: Money,
    pub quantity: i64,
    pub image: Option<String>,
    pub variant: Option<String>,
    /// `unit_price * quantity`.
    pub total_price: Money,
}

impl OrderLineItem {
    pub(crate) fn from_cart_line(line: &CartLine, total_price: Money) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            image: line.image.clone(),
            variant: line.variant.clone(),
            total_price,
        }
    }
}

/// A placed order.
///
/// Line items and amounts are frozen at creation; only status and the
/// shipment fields change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Customer user ID (None for guest).
    pub user_id: Option<UserId>,
    pub line_items: Vec<OrderLineItem>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub shipping_speed: ShippingSpeed,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub tax: Money,
    pub discount: Money,
    /// `max(0, subtotal + shipping_fee + tax - discount)`.
    pub total: Money,
    /// Normalized coupon code applied at checkout.
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set on the transition into `Shipped`.
    pub tracking_number: Option<String>,
    /// Set on the transition into `Shipped`.
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }

    /// Check if the order has a tracking number.
    pub fn is_trackable(&self) -> bool {
        self.tracking_number.is_some()
    }
}

/// Selections submitted with checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutRequest {
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub shipping_speed: ShippingSpeed,
    /// Coupon code as typed by the shopper.
    pub coupon_code: Option<String>,
    pub user_id: Option<UserId>,
}

impl CheckoutRequest {
    /// Guest checkout with standard shipping and no coupon.
    pub fn new(shipping_address: Address, payment_method: PaymentMethod) -> Self {
        Self {
            shipping_address,
            payment_method,
            shipping_speed: ShippingSpeed::Standard,
            coupon_code: None,
            user_id: None,
        }
    }

    pub fn with_speed(mut self, speed: ShippingSpeed) -> Self {
        self.shipping_speed = speed;
        self
    }

    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
