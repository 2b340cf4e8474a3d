//! Coupon codes and their evaluation.

use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Percentage off the subtotal; `value` is the percent.
    Percentage,
    /// Fixed amount off; `value` is in minor units.
    Fixed,
    /// Shipping fee waived; `value` is unused.
    FreeShipping,
}

/// A coupon table entry as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponDefinition {
    /// Code the shopper types (e.g., "SAVE10").
    pub code: String,
    /// Type of coupon.
    pub kind: CouponKind,
    /// Percent or minor units depending on `kind`.
    #[serde(default)]
    pub value: i64,
    /// Display label.
    pub label: String,
}

impl CouponDefinition {
    pub fn new(
        code: impl Into<String>,
        kind: CouponKind,
        value: i64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind,
            value,
            label: label.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CommerceError> {
        if self.code.trim().is_empty() {
            return Err(CommerceError::Config("coupon code must not be empty".to_string()));
        }
        let valid = match self.kind {
            CouponKind::Percentage => (0..=100).contains(&self.value),
            CouponKind::Fixed => self.value >= 0,
            CouponKind::FreeShipping => true,
        };
        if valid {
            Ok(())
        } else {
            Err(CommerceError::Config(format!(
                "coupon {} has invalid value {}",
                self.code, self.value
            )))
        }
    }
}

/// Resolved effect of a coupon code, derived fresh on every evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponDescriptor {
    /// Normalized (uppercase) code.
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub label: String,
}

impl CouponDescriptor {
    /// Discount this coupon grants on `subtotal`, before any capping.
    pub fn discount_on(&self, subtotal: Money) -> Option<Money> {
        match self.kind {
            CouponKind::Percentage => u32::try_from(self.value)
                .ok()
                .and_then(|percent| subtotal.percentage(percent)),
            CouponKind::Fixed => Some(Money::new(self.value, subtotal.currency)),
            CouponKind::FreeShipping => Some(Money::zero(subtotal.currency)),
        }
    }

    /// Check if the coupon waives the shipping fee.
    pub fn waives_shipping(&self) -> bool {
        self.kind == CouponKind::FreeShipping
    }
}

/// Static coupon table lookup.
///
/// Lookup is case-insensitive and ignores surrounding whitespace. There is
/// no usage counting or expiry.
#[derive(Debug, Clone, Default)]
pub struct CouponEvaluator {
    coupons: HashMap<String, CouponDescriptor>,
}

impl CouponEvaluator {
    /// Build from configured definitions. Later duplicates replace earlier
    /// ones; [`StoreConfig::validate`] rejects duplicates up front.
    pub fn new(definitions: &[CouponDefinition]) -> Self {
        let coupons = definitions
            .iter()
            .map(|d| {
                let code = normalize(&d.code);
                let descriptor = CouponDescriptor {
                    code: code.clone(),
                    kind: d.kind,
                    value: d.value,
                    label: d.label.clone(),
                };
                (code, descriptor)
            })
            .collect();
        Self { coupons }
    }

    /// Build from the store configuration's coupon table.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.coupons)
    }

    /// Resolve a code, `None` if it isn't in the table.
    pub fn evaluate(&self, code: &str) -> Option<CouponDescriptor> {
        self.coupons.get(&normalize(code)).cloned()
    }

    /// All known codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.coupons.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
