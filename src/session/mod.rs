//! Session Management Module
//!
//! Stateless cookie sessions: a signed token, encrypted for transport, carried
//! in an http-only cookie next to a script-readable marker cookie.
//!
//! # Modules
//!
//! - [`token`] - Signed session token issuance, validation and ttl parsing
//! - [`cipher`] - AES-256-GCM envelope around the token
//! - [`cookie`] - Cookie attribute policy and the two-cookie session pair

pub mod cipher;
pub mod cookie;
pub mod token;

// Re-export commonly used items for convenience
pub use cipher::TokenCipher;
pub use cookie::{
    parse_flag, CookieAttributes, SessionCookiePair, SessionCookiePolicy, ACCESS_TOKEN_COOKIE,
    AUTHENTICATED_COOKIE, AUTHENTICATED_MARKER,
};
pub use token::{parse_ttl, SessionToken, TokenIssuer, MAX_TOKEN_TTL_SECONDS};
