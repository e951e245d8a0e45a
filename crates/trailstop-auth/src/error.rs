//! Auth error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No stored credential and no seed refresh token supplied")]
    MissingSeed,

    #[error("No credential bootstrapped yet")]
    NotBootstrapped,

    #[error("Token endpoint rejected the refresh (HTTP {status})")]
    TokenRejected { status: u16 },

    #[error("Token endpoint unreachable: {0}")]
    Http(String),

    #[error("Secret codec error: {0}")]
    Crypto(String),

    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Store error: {0}")]
    Store(#[from] trailstop_store::StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;
