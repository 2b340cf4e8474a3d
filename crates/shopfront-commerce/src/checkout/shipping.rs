//! Shipping speed and payment method selections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommerceError;

/// Shipping speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingSpeed {
    #[default]
    Standard,
    Express,
}

impl ShippingSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingSpeed::Standard => "standard",
            ShippingSpeed::Express => "express",
        }
    }
}

impl fmt::Display for ShippingSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingSpeed {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ShippingSpeed::Standard),
            "express" => Ok(ShippingSpeed::Express),
            other => Err(CommerceError::Validation(format!(
                "unknown shipping speed: {other}"
            ))),
        }
    }
}

/// Payment selection recorded on the order. No payment is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment; only the last four digits are kept.
    Card { last4: String },
    /// UPI handle (e.g., "name@bank").
    Upi { handle: String },
    NetBanking { bank: String },
    CashOnDelivery,
}

impl PaymentMethod {
    /// Check the selection is well-formed.
    pub fn validate(&self) -> Result<(), CommerceError> {
        match self {
            PaymentMethod::Card { last4 } => {
                if last4.len() == 4 && last4.chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(CommerceError::Validation(
                        "card last4 must be four digits".to_string(),
                    ))
                }
            }
            PaymentMethod::Upi { handle } => {
                let valid = handle
                    .split_once('@')
                    .is_some_and(|(user, bank)| !user.is_empty() && !bank.is_empty());
                if valid {
                    Ok(())
                } else {
                    Err(CommerceError::Validation(format!(
                        "invalid UPI handle: {handle}"
                    )))
                }
            }
            PaymentMethod::NetBanking { bank } if bank.trim().is_empty() => Err(
                CommerceError::Validation("net banking requires a bank".to_string()),
            ),
            PaymentMethod::NetBanking { .. } | PaymentMethod::CashOnDelivery => Ok(()),
        }
    }

    /// Short label for order summaries.
    pub fn label(&self) -> String {
        match self {
            PaymentMethod::Card { last4 } => format!("Card ending {last4}"),
            PaymentMethod::Upi { handle } => format!("UPI ({handle})"),
            PaymentMethod::NetBanking { bank } => format!("Net banking ({bank})"),
            PaymentMethod::CashOnDelivery => "Cash on delivery".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_parse() {
        assert_eq!("Express".parse::<ShippingSpeed>().unwrap(), ShippingSpeed::Express);
        assert_eq!(" standard ".parse::<ShippingSpeed>().unwrap(), ShippingSpeed::Standard);
        assert!("overnight".parse::<ShippingSpeed>().is_err());
    }

    #[test]
    fn test_payment_validation() {
        assert!(PaymentMethod::Card { last4: "4242".into() }.validate().is_ok());
        assert!(PaymentMethod::Card { last4: "42a2".into() }.validate().is_err());
        assert!(PaymentMethod::Upi { handle: "asha@okbank".into() }.validate().is_ok());
        assert!(PaymentMethod::Upi { handle: "@okbank".into() }.validate().is_err());
        assert!(PaymentMethod::NetBanking { bank: " ".into() }.validate().is_err());
        assert!(PaymentMethod::CashOnDelivery.validate().is_ok());
    }

    #[test]
    fn test_payment_serde_tagged() {
        let json = serde_json::to_string(&PaymentMethod::Upi {
            handle: "asha@okbank".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"upi","handle":"asha@okbank"}"#);
        let cod: PaymentMethod = serde_json::from_str(r#"{"type":"cash_on_delivery"}"#).unwrap();
        assert_eq!(cod, PaymentMethod::CashOnDelivery);
    }
}
