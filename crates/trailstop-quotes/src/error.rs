//! Quote client error types.

use thiserror::Error;
use trailstop_core::Ticker;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Failed to build HTTP client: {0}")]
    Http(String),

    #[error("Quote request failed after {attempts} attempts: {last}")]
    Upstream { attempts: u32, last: String },

    #[error("Access token still rejected after refresh")]
    Unauthorized,

    #[error("No broker symbol matches ticker {0}")]
    SymbolNotFound(Ticker),

    #[error("Malformed upstream response: {0}")]
    Parse(String),

    #[error("Auth error: {0}")]
    Auth(#[from] trailstop_auth::AuthError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] trailstop_tracker::TrackerError),
}

pub type QuoteResult<T> = Result<T, QuoteError>;
