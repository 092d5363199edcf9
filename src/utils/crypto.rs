// Cryptographic primitives backing the session token and its cookie envelope

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Nonce size for AES-256-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Encryption key size for AES-256 (256 bits)
pub const ENCRYPTION_KEY_SIZE: usize = 32;

/// Authentication tag appended by AES-GCM to every ciphertext
pub const TAG_SIZE: usize = 16;

/// Generate a random secret suitable for signing or encryption
///
/// 32 bytes (256 bits) of entropy, standard base64 encoded so it can be pasted
/// into `Settings.toml` or an environment variable as-is.
#[must_use]
pub fn generate_secret() -> String {
    let mut secret = [0u8; ENCRYPTION_KEY_SIZE];
    rand::rng().fill_bytes(&mut secret);
    general_purpose::STANDARD.encode(secret)
}

/// Derive a 32-byte AES-256 key from arbitrary-length secret material
///
/// The secret is hashed with SHA-256, so short and long secrets both map to a
/// full-width key and two different secrets never share a prefix-derived key.
#[must_use]
pub fn derive_encryption_key(input_key: &[u8]) -> [u8; ENCRYPTION_KEY_SIZE] {
    let digest = Sha256::digest(input_key);
    let mut encryption_key = [0u8; ENCRYPTION_KEY_SIZE];
    encryption_key.copy_from_slice(&digest);
    encryption_key
}

/// Encrypt raw bytes with AES-256-GCM
///
/// # Returns
///
/// A Base64URL-encoded string containing the nonce followed by the ciphertext
/// and its authentication tag. Every call draws a fresh random nonce.
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - AES encryption fails
pub fn encrypt_bytes(plaintext: &[u8], key: &[u8]) -> Result<String> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("AES encryption failed: {e}"))?;

    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(&combined))
}

/// Decrypt a value produced by [`encrypt_bytes`]
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - Base64 decoding fails
/// - Data is shorter than a nonce plus tag
/// - AES decryption fails (wrong key, tampering, truncation)
pub fn decrypt_bytes(encrypted_data: &str, key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let combined = general_purpose::URL_SAFE_NO_PAD
        .decode(encrypted_data)
        .map_err(|e| anyhow!("Failed to decode base64 data: {e}"))?;

    if combined.len() < NONCE_SIZE + TAG_SIZE {
        return Err(anyhow!("Invalid data length"));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("AES decryption failed: {e}"))
}

/// Sign a message using HMAC-SHA256
///
/// # Errors
///
/// Returns an error if the secret is empty. HMAC itself accepts any key
/// length, but an empty secret means no signing key was configured.
pub fn sign_hmac_sha256(message: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    if secret.is_empty() {
        return Err(anyhow!("Signing key is not configured"));
    }

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
        .map_err(|e| anyhow!("Invalid HMAC key length: {e}"))?;
    mac.update(message);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an HMAC-SHA256 signature in constant time
#[must_use]
pub fn verify_hmac_sha256(message: &[u8], signature: &[u8], secret: &[u8]) -> bool {
    if secret.is_empty() {
        return false;
    }

    let Ok(mut mac) = <HmacSha256 as Mac>::new_from_slice(secret) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_for_hmac_testing_32b";

    #[test]
    fn test_generate_secret_is_random() {
        let first = generate_secret();
        let second = generate_secret();

        assert_ne!(first, second);
        assert_eq!(general_purpose::STANDARD.decode(&first).unwrap().len(), 32);
    }

    #[test]
    fn test_derive_encryption_key_is_stable() {
        let key1 = derive_encryption_key(b"short");
        let key2 = derive_encryption_key(b"short");
        let key3 = derive_encryption_key(b"shorter");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_eq!(key1.len(), ENCRYPTION_KEY_SIZE);
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = derive_encryption_key(TEST_SECRET);
        let encrypted = encrypt_bytes(b"hello world", &key).unwrap();

        let decrypted = decrypt_bytes(&encrypted, &key).unwrap();
        assert_eq!(decrypted, b"hello world");
    }

    #[test]
    fn test_encrypt_uses_fresh_nonce() {
        let key = derive_encryption_key(TEST_SECRET);
        let first = encrypt_bytes(b"same input", &key).unwrap();
        let second = encrypt_bytes(b"same input", &key).unwrap();

        assert_ne!(first, second, "Nonce must never be reused across calls");
    }

    #[test]
    fn test_invalid_key_length_rejected() {
        assert!(encrypt_bytes(b"data", b"too-short").is_err());
        assert!(decrypt_bytes("AAAA", b"too-short").is_err());
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let key = derive_encryption_key(TEST_SECRET);
        let other = derive_encryption_key(b"another secret");
        let encrypted = encrypt_bytes(b"payload", &key).unwrap();

        assert!(decrypt_bytes(&encrypted, &other).is_err());
    }

    #[test]
    fn test_decrypt_truncated_data_fails() {
        let key = derive_encryption_key(TEST_SECRET);
        let encrypted = encrypt_bytes(b"payload", &key).unwrap();
        // 12 base64 chars decode cleanly to 9 bytes, short of nonce plus tag
        let truncated = &encrypted[..12];

        let error = decrypt_bytes(truncated, &key).unwrap_err();
        assert!(error.to_string().contains("Invalid data length"));
    }

    #[test]
    fn test_decrypt_rejects_bad_base64() {
        let key = derive_encryption_key(TEST_SECRET);

        let error = decrypt_bytes("not base64 at all!", &key).unwrap_err();
        assert!(error.to_string().contains("Failed to decode base64 data"));
    }

    #[test]
    fn test_hmac_sha256_signing() {
        let signature = sign_hmac_sha256(b"test.message", TEST_SECRET).unwrap();

        assert_eq!(signature.len(), 32); // SHA-256 produces 32-byte hash
        assert_eq!(signature, sign_hmac_sha256(b"test.message", TEST_SECRET).unwrap());
    }

    #[test]
    fn test_hmac_sha256_empty_key_rejected() {
        let error = sign_hmac_sha256(b"test.message", b"").unwrap_err();
        assert!(error.to_string().contains("not configured"));
    }

    #[test]
    fn test_hmac_sha256_verification() {
        let signature = sign_hmac_sha256(b"test.message", TEST_SECRET).unwrap();

        assert!(verify_hmac_sha256(b"test.message", &signature, TEST_SECRET));
        assert!(!verify_hmac_sha256(b"test.message2", &signature, TEST_SECRET));
        assert!(!verify_hmac_sha256(b"test.message", &signature, b"other-secret"));
        assert!(!verify_hmac_sha256(b"test.message", &signature[..31], TEST_SECRET));
        assert!(!verify_hmac_sha256(b"test.message", &signature, b""));
    }
}
