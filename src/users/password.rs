//! Argon2id password hashing for stored administrator credentials

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;

/// PHC string verified when the identifier is unknown, so a miss costs the
/// same Argon2 work as a wrong password. Parameters match `Argon2::default()`.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    SaltString::encode_b64(&bytes)
}

/// Hash a password into a PHC string
///
/// # Errors
///
/// Returns an error if salt encoding or hashing fails.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

/// Check a password against a PHC string; malformed hashes never verify
#[must_use]
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .is_some_and(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
}

/// Whether a string parses as a PHC hash at all
#[must_use]
pub fn is_phc(hashword: &str) -> bool {
    PasswordHash::new(hashword).is_ok()
}
