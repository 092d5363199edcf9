//! Transport encryption for session tokens
//!
//! The signed token is encrypted before it is placed in a cookie so its
//! claims cannot be read from the cookie value or from a log line that
//! captured it.

use crate::auth::AuthError;
use crate::utils::crypto::{decrypt_bytes, derive_encryption_key, encrypt_bytes, ENCRYPTION_KEY_SIZE};

/// AES-256-GCM wrapper around the token string
#[derive(Clone)]
pub struct TokenCipher {
    encryption_key: Option<[u8; ENCRYPTION_KEY_SIZE]>,
}

impl TokenCipher {
    /// Build a cipher from secret material
    ///
    /// An empty secret leaves the cipher without a key; every operation then
    /// fails instead of encrypting under a predictable key.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let encryption_key = if secret.is_empty() {
            None
        } else {
            Some(derive_encryption_key(secret))
        };

        Self { encryption_key }
    }

    /// Encrypt a token string into an envelope
    ///
    /// # Errors
    ///
    /// Returns `EncryptionFailed` if no key is configured or AES fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AuthError> {
        let key = self
            .encryption_key
            .as_ref()
            .ok_or_else(|| AuthError::EncryptionFailed("encryption key is not configured".into()))?;

        encrypt_bytes(plaintext.as_bytes(), key).map_err(|e| AuthError::EncryptionFailed(e.to_string()))
    }

    /// Decrypt an envelope back into the token string
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` on a missing key, bad encoding, wrong key,
    /// tampering, truncation or non-UTF-8 plaintext. No partial output is
    /// ever returned.
    pub fn decrypt(&self, envelope: &str) -> Result<String, AuthError> {
        let key = self
            .encryption_key
            .as_ref()
            .ok_or_else(|| AuthError::DecryptionFailed("encryption key is not configured".into()))?;

        let plaintext =
            decrypt_bytes(envelope, key).map_err(|e| AuthError::DecryptionFailed(e.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AuthError::DecryptionFailed("plaintext is not UTF-8".into()))
    }
}
