//! Persisted record shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trailstop_core::{Price, Ticker};

/// The singleton OAuth credential row.
///
/// Token columns hold ciphertext produced by the secret codec; the store
/// never sees plaintext secrets. A refresh replaces the whole row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Encrypted access token.
    pub access_token: Vec<u8>,
    /// Encrypted refresh token.
    pub refresh_token: Vec<u8>,
    /// API server host returned by the token endpoint.
    pub api_server: String,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
}

/// One tracked symbol row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Normalized ticker (unique key).
    pub ticker: Ticker,
    /// Latest observed price.
    pub current_price: Price,
    /// Highest price observed since tracking began. Never decreases.
    pub peak_price: Price,
    /// Active stop-loss threshold: `peak_price * stop_loss_ratio`.
    pub stop_loss: Price,
    /// Quote currency.
    pub currency: String,
    /// Cached broker-internal symbol id, resolved lazily.
    pub broker_symbol_id: Option<u64>,
    /// When this symbol last produced a delivered alert.
    pub last_alerted_at: Option<DateTime<Utc>>,
}

impl SymbolRecord {
    /// Create a fresh row for a newly tracked symbol.
    ///
    /// Peak starts at the initial price and the threshold at
    /// `initial_price * ratio`, so a symbol added at its all-time high
    /// is not instantly breached.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        initial_price: Price,
        stop_loss: Price,
        currency: String,
    ) -> Self {
        Self {
            ticker,
            current_price: initial_price,
            peak_price: initial_price,
            stop_loss,
            currency,
            broker_symbol_id: None,
            last_alerted_at: None,
        }
    }
}
