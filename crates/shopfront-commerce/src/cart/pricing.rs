//! Checkout price calculation.
//!
//! The same breakdown backs the cart's checkout preview and the amounts
//! frozen into an order, so the two can never disagree.

use crate::cart::CouponDescriptor;
use crate::checkout::ShippingSpeed;
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Complete pricing breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Shipping fee after free-shipping rules.
    pub shipping_fee: Money,
    /// Flat-rate tax on the subtotal.
    pub tax: Money,
    /// Coupon discount, capped so the total can't go negative.
    pub discount: Money,
    /// `subtotal + shipping_fee + tax - discount`, never negative.
    pub total: Money,
}

impl PriceBreakdown {
    /// Price a subtotal for a shipping speed and optional coupon.
    ///
    /// Shipping is free when the subtotal reaches the configured threshold
    /// or the coupon waives it. An empty subtotal carries no shipping fee.
    pub fn compute(
        subtotal: Money,
        speed: ShippingSpeed,
        coupon: Option<&CouponDescriptor>,
        config: &StoreConfig,
    ) -> Result<Self, CommerceError> {
        if subtotal.currency != config.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: config.currency,
                got: subtotal.currency,
            });
        }

        let free_shipping = subtotal.is_zero()
            || subtotal.amount_cents >= config.shipping.free_shipping_threshold_cents
            || coupon.is_some_and(CouponDescriptor::waives_shipping);
        let shipping_fee = if free_shipping {
            config.money(0)
        } else {
            config.money(config.shipping.rate(speed).fee_cents)
        };

        let tax = subtotal
            .percentage(config.tax_rate_percent)
            .ok_or(CommerceError::Overflow)?;

        let gross = subtotal
            .try_add(&shipping_fee)
            .and_then(|m| m.try_add(&tax))
            .ok_or(CommerceError::Overflow)?;

        let discount = match coupon {
            Some(c) => c
                .discount_on(subtotal)
                .ok_or(CommerceError::Overflow)?
                .min(gross)
                .non_negative(),
            None => config.money(0),
        };

        let total = gross
            .try_subtract(&discount)
            .ok_or(CommerceError::Overflow)?
            .non_negative();

        Ok(Self {
            subtotal,
            shipping_fee,
            tax,
            discount,
            total,
        })
    }

    /// Check if any discount applies.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Check if shipping is free.
    pub fn is_free_shipping(&self) -> bool {
        self.shipping_fee.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CouponEvaluator;
    use crate::money::Currency;

    fn inr(major: i64) -> Money {
        Money::from_major(major, Currency::INR)
    }

    fn coupon(code: &str) -> CouponDescriptor {
        CouponEvaluator::from_config(&StoreConfig::default())
            .evaluate(code)
            .unwrap()
    }

    fn assert_total_invariant(p: &PriceBreakdown) {
        let expected = p.subtotal.amount_cents + p.shipping_fee.amount_cents + p.tax.amount_cents
            - p.discount.amount_cents;
        assert_eq!(p.total.amount_cents, expected.max(0));
    }

    #[test]
    fn test_below_threshold_pays_shipping() {
        let config = StoreConfig::default();
        let p = PriceBreakdown::compute(inr(200), ShippingSpeed::Standard, None, &config).unwrap();
        assert_eq!(p.shipping_fee, inr(40));
        assert_eq!(p.tax, inr(36));
        assert_eq!(p.total, inr(276));
        assert_total_invariant(&p);
    }

    #[test]
    fn test_express_fee() {
        let config = StoreConfig::default();
        let p = PriceBreakdown::compute(inr(200), ShippingSpeed::Express, None, &config).unwrap();
        assert_eq!(p.shipping_fee, inr(100));
    }

    #[test]
    fn test_threshold_ships_free() {
        let config = StoreConfig::default();
        let p = PriceBreakdown::compute(inr(500), ShippingSpeed::Express, None, &config).unwrap();
        assert!(p.is_free_shipping());
    }

    #[test]
    fn test_freeship_coupon_zeroes_shipping() {
        let config = StoreConfig::default();
        let freeship = coupon("FREESHIP");
        for subtotal in [1, 100, 499, 5000] {
            let p = PriceBreakdown::compute(
                inr(subtotal),
                ShippingSpeed::Express,
                Some(&freeship),
                &config,
            )
            .unwrap();
            assert!(p.is_free_shipping());
            assert!(!p.has_discount());
            assert_total_invariant(&p);
        }
    }

    #[test]
    fn test_save10_on_1000() {
        let config = StoreConfig::default();
        let p = PriceBreakdown::compute(
            inr(1000),
            ShippingSpeed::Standard,
            Some(&coupon("SAVE10")),
            &config,
        )
        .unwrap();
        assert_eq!(p.discount, inr(100));
        assert_eq!(p.total, inr(1000 + 180 - 100));
    }

    #[test]
    fn test_fixed_discount_never_drives_total_negative() {
        let config = StoreConfig {
            tax_rate_percent: 0,
            ..StoreConfig::default()
        };
        let flat = coupon("FLAT50");
        let p = PriceBreakdown::compute(
            Money::new(1_000, Currency::INR),
            ShippingSpeed::Standard,
            Some(&flat),
            &StoreConfig {
                shipping: crate::config::ShippingPolicy {
                    free_shipping_threshold_cents: 0,
                    ..config.shipping.clone()
                },
                ..config.clone()
            },
        )
        .unwrap();
        assert_eq!(p.discount, Money::new(1_000, Currency::INR));
        assert!(p.total.is_zero());
        assert_total_invariant(&p);
    }

    #[test]
    fn test_invariant_across_combinations() {
        let config = StoreConfig::default();
        let codes = [None, Some("SAVE10"), Some("SAVE20"), Some("FLAT50"), Some("FREESHIP")];
        for subtotal in [0, 1, 30, 499, 500, 2500] {
            for speed in [ShippingSpeed::Standard, ShippingSpeed::Express] {
                for code in codes {
                    let c = code.map(coupon);
                    let p = PriceBreakdown::compute(inr(subtotal), speed, c.as_ref(), &config)
                        .unwrap();
                    assert_total_invariant(&p);
                }
            }
        }
    }

    #[test]
    fn test_currency_mismatch() {
        let config = StoreConfig::default();
        let result = PriceBreakdown::compute(
            Money::from_major(10, Currency::USD),
            ShippingSpeed::Standard,
            None,
            &config,
        );
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }
}
