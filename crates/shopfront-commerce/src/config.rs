//! Store configuration.
//!
//! Everything that the containers treat as policy lives here: currency,
//! shipping fees and thresholds, tax, the coupon table and the storage keys
//! each container persists under. All fields have defaults, so a partial
//! file only needs to name what it overrides.
//!
//! ```toml
//! currency = "INR"
//! tax_rate_percent = 18
//!
//! [shipping]
//! free_shipping_threshold_cents = 50000
//!
//! [shipping.express]
//! fee_cents = 10000
//! delivery_days = 2
//!
//! [[coupons]]
//! code = "SAVE10"
//! kind = "percentage"
//! value = 10
//! label = "10% off"
//! ```

use crate::cart::{CouponDefinition, CouponKind};
use crate::checkout::ShippingSpeed;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Currency every price, fee and coupon amount is expressed in.
    pub currency: Currency,

    /// Flat tax on the subtotal, in percent.
    pub tax_rate_percent: u32,

    /// Catalog stock at or below this count reports as low stock.
    pub low_stock_threshold: i64,

    /// Shipping fees and free-shipping threshold.
    pub shipping: ShippingPolicy,

    /// Coupon table consulted by the coupon evaluator.
    pub coupons: Vec<CouponDefinition>,

    /// Storage key per container.
    pub storage: StorageKeys,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::INR,
            tax_rate_percent: 18,
            low_stock_threshold: 5,
            shipping: ShippingPolicy::default(),
            coupons: default_coupons(),
            storage: StorageKeys::default(),
        }
    }
}

fn default_coupons() -> Vec<CouponDefinition> {
    vec![
        CouponDefinition::new("SAVE10", CouponKind::Percentage, 10, "10% off"),
        CouponDefinition::new("SAVE20", CouponKind::Percentage, 20, "20% off"),
        CouponDefinition::new("FLAT50", CouponKind::Fixed, 5_000, "\u{20b9}50 off"),
        CouponDefinition::new("FREESHIP", CouponKind::FreeShipping, 0, "Free shipping"),
    ]
}

impl StoreConfig {
    /// Load config from a file: JSON when the path ends in `.json`, TOML
    /// otherwise. The result is validated before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: StoreConfig = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                CommerceError::Config(format!("failed to parse JSON {}: {}", path.display(), e))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                CommerceError::Config(format!("failed to parse TOML {}: {}", path.display(), e))
            })?
        };

        config.validate()?;
        tracing::info!(path = %path.display(), coupons = config.coupons.len(), "loaded store config");
        Ok(config)
    }

    /// Save config to a file, in the format implied by the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommerceError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| CommerceError::Config(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| CommerceError::Config(e.to_string()))?
        };
        std::fs::write(path, content).map_err(|e| {
            CommerceError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// Reject configurations that would break pricing invariants.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.tax_rate_percent > 100 {
            return Err(CommerceError::Config(format!(
                "tax_rate_percent must be at most 100, got {}",
                self.tax_rate_percent
            )));
        }
        self.shipping.validate()?;

        let mut codes = HashSet::new();
        for coupon in &self.coupons {
            coupon.validate()?;
            if !codes.insert(coupon.code.trim().to_ascii_uppercase()) {
                return Err(CommerceError::Config(format!(
                    "duplicate coupon code: {}",
                    coupon.code
                )));
            }
        }

        self.storage.validate()
    }

    /// Build a Money value in the store currency.
    pub fn money(&self, amount_cents: i64) -> Money {
        Money::new(amount_cents, self.currency)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Shipping fee policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPolicy {
    /// Subtotals at or above this ship free.
    pub free_shipping_threshold_cents: i64,
    /// Standard delivery.
    pub standard: ShippingRate,
    /// Express delivery.
    pub express: ShippingRate,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold_cents: 50_000,
            standard: ShippingRate {
                fee_cents: 4_000,
                delivery_days: 5,
            },
            express: ShippingRate {
                fee_cents: 10_000,
                delivery_days: 2,
            },
        }
    }
}

impl ShippingPolicy {
    /// Rate for a shipping speed.
    pub fn rate(&self, speed: ShippingSpeed) -> &ShippingRate {
        match speed {
            ShippingSpeed::Standard => &self.standard,
            ShippingSpeed::Express => &self.express,
        }
    }

    fn validate(&self) -> Result<(), CommerceError> {
        if self.free_shipping_threshold_cents < 0 {
            return Err(CommerceError::Config(
                "free_shipping_threshold_cents must not be negative".to_string(),
            ));
        }
        for (name, rate) in [("standard", &self.standard), ("express", &self.express)] {
            if rate.fee_cents < 0 {
                return Err(CommerceError::Config(format!(
                    "{name} shipping fee must not be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Fee and delivery estimate for one shipping speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Flat fee in minor units.
    pub fee_cents: i64,
    /// Days from shipment to estimated delivery.
    pub delivery_days: u32,
}

/// Storage key of each container's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub cart: String,
    pub wishlist: String,
    pub reviews: String,
    pub orders: String,
    pub addresses: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "cart-storage".to_string(),
            wishlist: "wishlist-storage".to_string(),
            reviews: "review-storage".to_string(),
            orders: "order-storage".to_string(),
            addresses: "address-storage".to_string(),
        }
    }
}

impl StorageKeys {
    fn validate(&self) -> Result<(), CommerceError> {
        let keys = [
            &self.cart,
            &self.wishlist,
            &self.reviews,
            &self.orders,
            &self.addresses,
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(CommerceError::Config("storage keys must not be empty".to_string()));
        }
        let distinct: HashSet<&String> = keys.iter().copied().collect();
        if distinct.len() != keys.len() {
            return Err(CommerceError::Config("storage keys must be distinct".to_string()));
        }
        Ok(())
    }
}
