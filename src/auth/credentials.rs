use actix_web::web;
use std::sync::Arc;

use crate::auth::AuthError;
use crate::models::{Credentials, UserIdentity};
use crate::users::{password, UserStore};

/// Checks submitted credentials against the user store
///
/// Unknown email, inactive account and wrong password all come back as the
/// same `AuthenticationFailed`. A dummy hash is verified for unknown emails so
/// the miss costs one Argon2 run like a hit does.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Verify credentials and return the matching identity
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` for any mismatch.
    pub async fn verify(&self, credentials: &Credentials) -> Result<UserIdentity, AuthError> {
        let user = self.store.find_by_email(&credentials.identifier).await;

        let hashword = user
            .as_ref()
            .map_or_else(|| password::DUMMY_PASSWORD_HASH.to_string(), |u| u.password_hash.clone());
        let secret = credentials.secret.clone();

        // Argon2 is CPU-bound; keep it off the async workers
        let matched = web::block(move || password::verify(&secret, &hashword))
            .await
            .unwrap_or_else(|e| {
                log::error!("Password verification task failed: {e}");
                false
            });

        match user {
            Some(user) if matched && user.active => Ok(user.identity),
            _ => Err(AuthError::AuthenticationFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestFixtures, TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD};
    use crate::users::{InMemoryUserStore, StoredUser};

    fn credentials(identifier: &str, secret: &str) -> Credentials {
        Credentials {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_valid_credentials() {
        let verifier = CredentialVerifier::new(TestFixtures::user_store());

        let identity = verifier
            .verify(&credentials(TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(identity.email, TEST_ADMIN_EMAIL);
    }

    #[actix_web::test]
    async fn test_email_lookup_ignores_case() {
        let verifier = CredentialVerifier::new(TestFixtures::user_store());

        let upper = TEST_ADMIN_EMAIL.to_uppercase();
        assert!(verifier
            .verify(&credentials(&upper, TEST_ADMIN_PASSWORD))
            .await
            .is_ok());
    }

    #[actix_web::test]
    async fn test_rejections_are_indistinguishable() {
        let inactive = StoredUser::new(
            "retired@example.com",
            "Retired",
            TestFixtures::admin_password_hash(),
        )
        .deactivated();
        let store = InMemoryUserStore::new()
            .with_user(TestFixtures::admin_user())
            .with_user(inactive);
        let verifier = CredentialVerifier::new(Arc::new(store));

        let unknown = verifier
            .verify(&credentials("nobody@example.com", TEST_ADMIN_PASSWORD))
            .await
            .unwrap_err();
        let wrong_password = verifier
            .verify(&credentials(TEST_ADMIN_EMAIL, "wrong-password"))
            .await
            .unwrap_err();
        let retired = verifier
            .verify(&credentials("retired@example.com", TEST_ADMIN_PASSWORD))
            .await
            .unwrap_err();

        assert_eq!(unknown, AuthError::AuthenticationFailed);
        assert_eq!(unknown, wrong_password);
        assert_eq!(unknown, retired);
        assert_eq!(unknown.to_string(), wrong_password.to_string());
    }
}
