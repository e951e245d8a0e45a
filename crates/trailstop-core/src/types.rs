//! Shared value types.

use crate::{Price, Ticker};
use serde::{Deserialize, Serialize};

/// A merged broker quote for one tracked symbol.
///
/// Produced by the quote client after batching; `symbol_id` is the
/// broker-internal numeric identifier the quote endpoint is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Normalized ticker the quote belongs to.
    pub ticker: Ticker,
    /// Broker-internal symbol id.
    pub symbol_id: u64,
    /// Last trade price.
    pub last_trade_price: Price,
    /// Quote currency (e.g. "USD", "CAD").
    pub currency: String,
}
