//! Checkout module.
//!
//! Contains addresses, shipping and payment selections, orders and the
//! order store.

mod address;
mod order;
mod shipping;
mod store;

pub use address::{Address, AddressBook, AddressBookState};
pub use order::{CheckoutRequest, Order, OrderLineItem, OrderStatus};
pub use shipping::{PaymentMethod, ShippingSpeed};
pub use store::{OrderBook, OrderStore};
