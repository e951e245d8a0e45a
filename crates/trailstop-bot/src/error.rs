//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Auth error: {0}")]
    Auth(#[from] trailstop_auth::AuthError),

    #[error("Quote error: {0}")]
    Quote(#[from] trailstop_quotes::QuoteError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] trailstop_tracker::TrackerError),

    #[error("Notification error: {0}")]
    Notify(#[from] trailstop_notify::NotifyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] trailstop_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
