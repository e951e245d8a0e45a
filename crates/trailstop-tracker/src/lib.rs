//! Trailing stop-loss tracking for the trailstop bot.
//!
//! Owns the tracked-symbol state machine:
//! - `peak_price` only ever rises; the stop-loss threshold ratchets up
//!   with it and never falls
//! - a price below the threshold marks the symbol pending-alert
//! - `flush_alerts` aggregates due breaches into one message with a
//!   per-symbol 24 h cooldown

pub mod alerts;
pub mod error;
pub mod tracker;

pub use alerts::{compose_alert_message, ALERT_SUBJECT};
pub use error::{TrackerError, TrackerResult};
pub use tracker::{FlushOutcome, PositionTracker, UpdateOutcome, ALERT_COOLDOWN_SECS};
