//! Shopping cart module.
//!
//! Contains the stock-aware cart container, coupon evaluation and pricing.

#[allow(clippy::module_inception)]
mod cart;
mod coupon;
mod pricing;

pub use cart::{CartChange, CartLine, CartState, CartStore, StockWarning};
pub use coupon::{CouponDefinition, CouponDescriptor, CouponEvaluator, CouponKind};
pub use pricing::PriceBreakdown;
