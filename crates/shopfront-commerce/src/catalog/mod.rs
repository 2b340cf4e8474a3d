//! Catalog module.
//!
//! The catalog is an external collaborator: the cart consults it for
//! current price and stock through [`CatalogPort`].

mod inventory;
mod product;

pub use inventory::InventoryLevel;
pub use product::{CatalogPort, CatalogProduct, ProductListing, StaticCatalog, StockStatus};
