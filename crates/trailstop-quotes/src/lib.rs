//! Broker REST quote client for the trailstop bot.
//!
//! Covers the authenticated market-data surface: symbol id resolution,
//! batched quote fetches, account position discovery and the full sync
//! pass that feeds prices into the position tracker. Requests are paced
//! by a minimum inter-request gap and retried; an HTTP 401 triggers at
//! most one credential refresh per logical call.

pub mod api;
pub mod client;
pub mod error;

pub use api::{PositionEntry, QuoteEntry};
pub use client::{QuoteClient, QuoteClientConfig, SyncReport, MAX_ATTEMPTS};
pub use error::{QuoteError, QuoteResult};
