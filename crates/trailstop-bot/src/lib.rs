//! Trailing stop-loss brokerage alert bot.
//!
//! Polls broker quotes on one cadence and flushes breach alerts on
//! another. The stop-loss threshold trails the highest observed price:
//! it ratchets up with every new peak and never moves down.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, NtfyConfig, Secrets, SymbolConfig};
pub use error::{AppError, AppResult};
