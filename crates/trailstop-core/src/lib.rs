//! Core domain types for the trailstop alert bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Ticker`: Normalized symbol identifier (unique key for tracked symbols)
//! - `Price`: Precision-safe price type backed by `rust_decimal`
//! - `Quote`: A merged broker quote keyed by broker-internal symbol id

pub mod decimal;
pub mod error;
pub mod symbol;
pub mod types;

pub use decimal::Price;
pub use error::{CoreError, Result};
pub use symbol::Ticker;
pub use types::Quote;
