//! Wire shapes for the broker REST endpoints.
//!
//! The broker keys its market-data endpoints by a numeric symbol id, not
//! by ticker; prices arrive as JSON numbers and fields the exchange has
//! no data for arrive as `null`.

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct SymbolSearchResponse {
    pub symbols: Vec<SymbolSearchEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SymbolSearchEntry {
    pub symbol: String,
    pub symbol_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuotesResponse {
    pub quotes: Vec<QuoteEntry>,
}

/// One raw quote from the batched quotes endpoint.
///
/// `last_trade_price` is absent outside market hours for some symbols;
/// callers skip those rather than treating them as zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEntry {
    pub symbol: String,
    pub symbol_id: u64,
    pub last_trade_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountsResponse {
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountEntry {
    pub number: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositionsResponse {
    pub positions: Vec<PositionEntry>,
}

/// One open position from the accounts endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    pub symbol: String,
    pub symbol_id: u64,
    pub current_price: Option<Decimal>,
}
