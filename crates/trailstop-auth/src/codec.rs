//! Encrypted-at-rest secret codec.
//!
//! Transparent encode/decode pair wrapped around the credential token
//! columns: AES-256-GCM with a random 96-bit nonce prepended to the
//! ciphertext. The key is supplied externally (hex-encoded environment
//! variable); plaintext secrets are zeroized on drop and never logged.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use crate::error::{AuthError, AuthResult};

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Required key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Symmetric codec for secret columns.
pub struct SecretCodec {
    cipher: Aes256Gcm,
}

impl SecretCodec {
    /// Create a codec from a raw 32-byte key.
    pub fn new(key: &[u8]) -> AuthResult<Self> {
        if key.len() != KEY_LEN {
            return Err(AuthError::InvalidKey(format!(
                "key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(key);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create a codec from a hex-encoded 32-byte key.
    pub fn from_hex(key_hex: &str) -> AuthResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(key_hex.trim())
                .map_err(|e| AuthError::InvalidKey(format!("key is not valid hex: {e}")))?,
        );
        Self::new(&bytes)
    }

    /// Encrypt a secret string into a nonce-prefixed blob.
    pub fn encode(&self, plaintext: &str) -> AuthResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AuthError::Crypto(format!("encrypt failed: {e}")))?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend(ciphertext);
        Ok(blob)
    }

    /// Decrypt a nonce-prefixed blob back into the secret string.
    ///
    /// The returned plaintext is zeroized when dropped.
    pub fn decode(&self, blob: &[u8]) -> AuthResult<Zeroizing<String>> {
        if blob.len() < NONCE_LEN {
            return Err(AuthError::Crypto("ciphertext too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(nonce, ciphertext)
                .map_err(|e| AuthError::Crypto(format!("decrypt failed: {e}")))?,
        );

        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| AuthError::Crypto("decrypted secret is not UTF-8".to_string()))
    }
}
