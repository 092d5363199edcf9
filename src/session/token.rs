//! Signed session tokens
//!
//! A session token is a compact HS256 JWT carrying `sub`, `iat` and `exp`.
//! It is the inner layer of the session; the cookie only ever holds it
//! encrypted (see [`crate::session::cipher`]).

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::utils::crypto::{sign_hmac_sha256, verify_hmac_sha256};

const JWT_ALGORITHM: &str = "HS256";
const JWT_TYPE: &str = "JWT";

/// Claims of an issued session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// `UserIdentity::id` the token is bound to
    #[serde(rename = "sub")]
    pub subject: Uuid,
    /// Unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Unix seconds, always `issued_at + ttl`
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 86_400;

/// Parse the configured token lifetime into seconds
///
/// Accepts a positive integer up to [`MAX_TOKEN_TTL_SECONDS`], optionally
/// followed by `s`, `m`, `h` or `d`.
///
/// # Errors
///
/// Returns `ConfigurationInvalid` for empty, non-numeric, zero, negative,
/// overflowing or over-long values. The raw value is kept out of the error message.
pub fn parse_ttl(raw: &str) -> Result<i64, AuthError> {
    let value = raw.trim();
    let invalid = || AuthError::ConfigurationInvalid("token ttl is not a valid duration".into());

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 3_600),
        Some((idx, 'd')) => (&value[..idx], 86_400),
        Some(_) => (value, 1),
        None => return Err(invalid()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;
    if seconds <= 0 {
        return Err(AuthError::ConfigurationInvalid(
            "token ttl must be greater than zero".into(),
        ));
    }
    if seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(AuthError::ConfigurationInvalid(format!(
            "token ttl must not exceed {MAX_TOKEN_TTL_SECONDS} seconds"
        )));
    }

    Ok(seconds)
}

/// Issues and validates signed session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    signing_key: Vec<u8>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            signing_key: signing_key.to_vec(),
        }
    }

    /// Issue a token for `subject` valid for `ttl_seconds` from now
    ///
    /// # Errors
    ///
    /// Returns `TokenCreationFailed` if signing fails.
    pub fn issue(&self, subject: Uuid, ttl_seconds: i64) -> Result<String, AuthError> {
        self.issue_at(subject, ttl_seconds, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// Returns `TokenCreationFailed` if the signing key is missing, the ttl is
    /// not positive, or the expiry overflows.
    pub fn issue_at(&self, subject: Uuid, ttl_seconds: i64, now: i64) -> Result<String, AuthError> {
        if ttl_seconds <= 0 {
            return Err(AuthError::TokenCreationFailed(format!(
                "ttl must be positive, got {ttl_seconds}"
            )));
        }
        let expires_at = now.checked_add(ttl_seconds).ok_or_else(|| {
            AuthError::TokenCreationFailed("token expiry overflows".into())
        })?;

        let claims = SessionToken {
            subject,
            issued_at: now,
            expires_at,
        };
        let header = JwtHeader {
            alg: JWT_ALGORITHM.to_string(),
            typ: JWT_TYPE.to_string(),
        };

        let header_json = serde_json::to_vec(&header)
            .map_err(|e| AuthError::TokenCreationFailed(format!("header serialization: {e}")))?;
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::TokenCreationFailed(format!("claims serialization: {e}")))?;

        let header_b64 = general_purpose::URL_SAFE_NO_PAD.encode(header_json);
        let claims_b64 = general_purpose::URL_SAFE_NO_PAD.encode(claims_json);
        let message = format!("{header_b64}.{claims_b64}");

        let signature = sign_hmac_sha256(message.as_bytes(), &self.signing_key)
            .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))?;
        let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        Ok(format!("{message}.{signature_b64}"))
    }

    /// Validate a token against the current time
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` on any failure.
    pub fn validate(&self, token: &str) -> Result<SessionToken, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate a token as if the current time were `now`
    ///
    /// Signature, header, subject and expiry are all checked. Which check
    /// failed is logged at debug level and never returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` on any failure.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<SessionToken, AuthError> {
        self.check(token, now).map_err(|reason| {
            log::debug!("Session token rejected: {reason}");
            AuthError::InvalidToken
        })
    }

    fn check(&self, token: &str, now: i64) -> Result<SessionToken, &'static str> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err("token is not three dot-separated segments");
        };

        let signature = general_purpose::URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| "signature is not base64url")?;
        let message = &token[..header_b64.len() + 1 + claims_b64.len()];
        if !verify_hmac_sha256(message.as_bytes(), &signature, &self.signing_key) {
            return Err("signature mismatch");
        }

        let header: JwtHeader = general_purpose::URL_SAFE_NO_PAD
            .decode(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or("header is malformed")?;
        if header.alg != JWT_ALGORITHM {
            return Err("unexpected signing algorithm");
        }

        // A non-UUID `sub` fails deserialization here
        let claims: SessionToken = general_purpose::URL_SAFE_NO_PAD
            .decode(claims_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or("claims are malformed")?;

        if claims.subject.is_nil() {
            return Err("subject is nil");
        }
        if claims.issued_at > claims.expires_at {
            return Err("issued after expiry");
        }
        if claims.expires_at <= now {
            return Err("token expired");
        }

        Ok(claims)
    }
}
