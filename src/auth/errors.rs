//! Authentication error taxonomy
//!
//! Every failure in the session core is one of these variants. Each variant
//! carries its HTTP status and the message that is safe to show a caller;
//! the `Display` text holds the internal detail and only ever goes to the log.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::utils::responses::ResponseBuilder;

/// Message returned for any rejected login attempt
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Invalid email or password";

/// Message returned for any rejected identity check
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Message returned for any server-side fault
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message returned for request bodies that fail schema validation
pub const MALFORMED_REQUEST_MESSAGE: &str = "Invalid request body";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Inbound body did not match the expected schema
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Unknown identifier, inactive user or wrong secret (one variant for all three)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// TTL or cookie flag configuration could not be parsed
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// Signing the session token failed
    #[error("Token creation failed: {0}")]
    TokenCreationFailed(String),

    /// Encrypting the session token failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Signature, expiry or subject check failed
    #[error("Invalid token")]
    InvalidToken,

    /// Envelope could not be decrypted
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Identity check rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AuthError {
    /// HTTP status the variant maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed
            | Self::InvalidToken
            | Self::DecryptionFailed(_)
            | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ConfigurationInvalid(_)
            | Self::TokenCreationFailed(_)
            | Self::EncryptionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that may be shown to the caller
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => MALFORMED_REQUEST_MESSAGE,
            Self::AuthenticationFailed => AUTHENTICATION_FAILED_MESSAGE,
            Self::InvalidToken | Self::DecryptionFailed(_) | Self::Unauthorized(_) => {
                UNAUTHORIZED_MESSAGE
            }
            Self::ConfigurationInvalid(_)
            | Self::TokenCreationFailed(_)
            | Self::EncryptionFailed(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Whether the failure is a deployment or crypto fault rather than a client error
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::message(self.status(), self.public_message())
    }
}
