use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::auth::AuthError;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body of `POST /auth/login`
///
/// `identifier`/`secret` are accepted as aliases so generic clients can use
/// the same field names as the credential contract.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "identifier")]
    pub email: String,
    #[serde(alias = "secret")]
    pub password: String,
}

impl LoginRequest {
    /// Validate the body and turn it into [`Credentials`]
    ///
    /// # Errors
    ///
    /// Returns `MalformedRequest` if either field is blank.
    pub fn into_credentials(self) -> Result<Credentials, AuthError> {
        let identifier = self.email.trim();
        if identifier.is_empty() {
            return Err(AuthError::MalformedRequest("email is required".into()));
        }
        if self.password.is_empty() {
            return Err(AuthError::MalformedRequest("password is required".into()));
        }

        Ok(Credentials {
            identifier: identifier.to_string(),
            secret: self.password,
        })
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Submitted identifier/secret pair, alive only for one login request
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Administrator profile returned by `GET /auth/me`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}
