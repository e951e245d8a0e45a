//! Store error types.

use thiserror::Error;
use trailstop_core::Ticker;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Symbol already tracked: {0}")]
    DuplicateSymbol(Ticker),

    #[error("Symbol not tracked: {0}")]
    SymbolNotFound(Ticker),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
