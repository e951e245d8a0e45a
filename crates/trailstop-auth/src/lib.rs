//! OAuth credential lifecycle for the trailstop bot.
//!
//! Owns the single active broker credential:
//! - Secrets are encrypted at rest with AES-256-GCM (`SecretCodec`)
//! - Expired access tokens are refreshed transparently on read
//! - Refresh-token exchanges are serialized so concurrent callers never
//!   burn the same (single-use) refresh token twice

pub mod codec;
pub mod credentials;
pub mod error;
pub mod token_client;

pub use codec::SecretCodec;
pub use credentials::{AccessToken, CredentialStore, EXPIRY_SKEW};
pub use error::{AuthError, AuthResult};
pub use token_client::{TokenClient, TokenGrant};
