//! Tracker error types.

use rust_decimal::Decimal;
use thiserror::Error;
use trailstop_core::Ticker;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Stop-loss ratio must be in (0, 1], got {0}")]
    InvalidRatio(Decimal),

    #[error("Symbol already tracked: {0}")]
    Duplicate(Ticker),

    #[error("Symbol not tracked: {0}")]
    NotFound(Ticker),

    #[error("Store error: {0}")]
    Store(#[from] trailstop_store::StoreError),

    #[error("Notification error: {0}")]
    Notify(#[from] trailstop_notify::NotifyError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
