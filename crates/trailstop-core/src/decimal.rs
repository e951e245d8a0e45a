//! Precision-safe price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors in stop-loss threshold math.

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety for quote prices and
/// stop-loss thresholds. Prices are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() {
            return Err(CoreError::InvalidPrice(format!(
                "price must be non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Scale by a fraction (e.g. the stop-loss ratio).
    ///
    /// The ratio is validated at configuration time, so the product
    /// of two non-negative values stays non-negative.
    #[inline]
    #[must_use]
    pub fn scale(&self, ratio: Decimal) -> Self {
        Self(self.0 * ratio)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Decimal = s.parse()?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_negative() {
        assert!(Price::new(dec!(-1)).is_err());
        assert!(Price::new(dec!(0)).is_ok());
        assert!(Price::new(dec!(101.25)).is_ok());
    }

    #[test]
    fn test_scale_is_exact() {
        let price = Price::new(dec!(120)).unwrap();
        assert_eq!(price.scale(dec!(0.9)), Price::new(dec!(108)).unwrap());
    }

    #[test]
    fn test_parse_and_display() {
        let price: Price = "99.50".parse().unwrap();
        assert_eq!(price.to_string(), "99.50");
        assert!("abc".parse::<Price>().is_err());
        assert!("-5".parse::<Price>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let price = Price::new(dec!(42.5)).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"42.5\"");
    }
}
