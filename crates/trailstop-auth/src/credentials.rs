//! The credential store: single active OAuth credential with
//! expiry-triggered refresh.
//!
//! All refresh-token exchanges are serialized behind one async mutex.
//! Refresh tokens are single-use at the broker, so a 401-triggered
//! refresh racing an expiry-triggered refresh must never both reach the
//! token endpoint; the loser of the lock re-reads the store and finds a
//! fresh credential already in place.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use trailstop_store::{CredentialRecord, StateStore};

use crate::codec::SecretCodec;
use crate::error::{AuthError, AuthResult};
use crate::token_client::{TokenClient, TokenGrant};

/// Safety margin before nominal expiry, in seconds. A token this close
/// to expiring is treated as expired so it never dies mid-request.
pub const EXPIRY_SKEW: i64 = 30;

/// A decrypted access token plus the API server it is valid for.
///
/// Zeroized on drop; never log the `token` field.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken {
    pub token: String,
    pub api_server: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("api_server", &self.api_server)
            .finish()
    }
}

/// Owns the singleton broker credential.
pub struct CredentialStore<S> {
    store: Arc<S>,
    codec: SecretCodec,
    token_client: TokenClient,
    /// Serializes all refresh-token exchanges.
    refresh_lock: Mutex<()>,
}

impl<S: StateStore> CredentialStore<S> {
    pub fn new(store: Arc<S>, codec: SecretCodec, token_client: TokenClient) -> Self {
        Self {
            store,
            codec,
            token_client,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Ensure a credential exists, exchanging the seed refresh token if
    /// the store is empty.
    ///
    /// Fails with `MissingSeed` when neither a stored credential nor a
    /// seed token is available; the caller treats that as fatal startup
    /// configuration.
    pub async fn bootstrap(&self, seed_refresh_token: Option<&str>) -> AuthResult<()> {
        if self.store.load_credential()?.is_some() {
            debug!("Credential already present, skipping seed exchange");
            return Ok(());
        }

        let seed = seed_refresh_token.ok_or(AuthError::MissingSeed)?;
        info!("No stored credential, exchanging seed refresh token");
        let grant = self.token_client.exchange(seed).await?;
        self.persist_grant(grant)?;
        Ok(())
    }

    /// Return a valid access token, refreshing first if the stored one
    /// is expired (or inside the expiry skew).
    pub async fn access_token(&self) -> AuthResult<AccessToken> {
        let row = self.load_row()?;
        if is_fresh(&row) {
            return self.decode_access(&row);
        }

        let _guard = self.refresh_lock.lock().await;
        // Double-checked: another task may have refreshed while we
        // waited on the lock.
        let row = self.load_row()?;
        if is_fresh(&row) {
            return self.decode_access(&row);
        }

        debug!(expires_at = %row.expires_at, "Access token expired, refreshing");
        let row = self.refresh_row(&row).await?;
        self.decode_access(&row)
    }

    /// 401 path: the given access token was rejected upstream. Refresh
    /// only if the stored token still matches it; otherwise a concurrent
    /// refresh already replaced the credential and there is nothing to do.
    pub async fn invalidate(&self, stale_access_token: &str) -> AuthResult<()> {
        let _guard = self.refresh_lock.lock().await;
        let row = self.load_row()?;

        let current = self.codec.decode(&row.access_token)?;
        if current.as_str() != stale_access_token {
            debug!("Rejected token already replaced by a concurrent refresh");
            return Ok(());
        }

        warn!("Access token rejected upstream, forcing refresh");
        self.refresh_row(&row).await?;
        Ok(())
    }

    fn load_row(&self) -> AuthResult<CredentialRecord> {
        self.store
            .load_credential()?
            .ok_or(AuthError::NotBootstrapped)
    }

    /// Exchange the stored refresh token and atomically replace the row.
    /// On exchange failure the stored credential is left untouched.
    async fn refresh_row(&self, row: &CredentialRecord) -> AuthResult<CredentialRecord> {
        let refresh_token = self.codec.decode(&row.refresh_token)?;
        let grant = self.token_client.exchange(&refresh_token).await?;
        self.persist_grant(grant)
    }

    fn persist_grant(&self, grant: TokenGrant) -> AuthResult<CredentialRecord> {
        let record = CredentialRecord {
            access_token: self.codec.encode(&grant.access_token)?,
            refresh_token: self.codec.encode(&grant.refresh_token)?,
            api_server: grant.api_server,
            expires_at: grant.expires_at,
        };
        self.store.replace_credential(record.clone())?;
        info!(expires_at = %record.expires_at, "Credential replaced");
        Ok(record)
    }

    fn decode_access(&self, row: &CredentialRecord) -> AuthResult<AccessToken> {
        let token = self.codec.decode(&row.access_token)?;
        Ok(AccessToken {
            token: token.to_string(),
            api_server: row.api_server.clone(),
        })
    }
}

fn is_fresh(row: &CredentialRecord) -> bool {
    row.expires_at > Utc::now() + ChronoDuration::seconds(EXPIRY_SKEW)
}
