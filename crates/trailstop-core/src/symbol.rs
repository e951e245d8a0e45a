//! Ticker symbol identification.
//!
//! A `Ticker` is the primary key for tracked symbols. Construction
//! normalizes to uppercase so "aapl", "Aapl" and "AAPL" are the same key.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest ticker accepted (covers exchange suffixes like "BRK.B" or "RY.TO").
const MAX_TICKER_LEN: usize = 12;

/// Normalized, uppercase ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker, normalizing to uppercase.
    ///
    /// Rejects empty input, embedded whitespace, and overlong symbols.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidTicker("empty ticker".to_string()));
        }
        if trimmed.len() > MAX_TICKER_LEN {
            return Err(CoreError::InvalidTicker(format!(
                "ticker too long ({} > {MAX_TICKER_LEN}): {trimmed}",
                trimmed.len()
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidTicker(format!(
                "ticker contains whitespace: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_to_uppercase() {
        let ticker = Ticker::new("aapl").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
        assert_eq!(ticker, Ticker::new(" AAPL ").unwrap());
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(Ticker::new("").is_err());
        assert!(Ticker::new("   ").is_err());
        assert!(Ticker::new("A B").is_err());
        assert!(Ticker::new("WAYTOOLONGTICKER").is_err());
    }

    #[test]
    fn test_exchange_suffixes_allowed() {
        assert_eq!(Ticker::new("ry.to").unwrap().as_str(), "RY.TO");
        assert_eq!(Ticker::new("brk.b").unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn test_serde_round_trip() {
        let ticker = Ticker::new("shop.to").unwrap();
        let json = serde_json::to_string(&ticker).unwrap();
        assert_eq!(json, "\"SHOP.TO\"");
        let back: Ticker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticker);
    }
}
