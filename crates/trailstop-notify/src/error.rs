//! Notification error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed on channel {channel}: {reason}")]
    Delivery { channel: String, reason: String },

    #[error("Every configured channel failed to deliver")]
    AllChannelsFailed,

    #[error("Channel misconfigured: {0}")]
    Config(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
