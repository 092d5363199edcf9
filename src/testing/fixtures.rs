//! Pre-built configuration, users and gates for tests

use std::sync::{Arc, OnceLock};

use crate::auth::{AuthConfig, AuthenticationGate};
use crate::session::{ACCESS_TOKEN_COOKIE, AUTHENTICATED_COOKIE};
use crate::users::{password, InMemoryUserStore, StoredUser, UserStore};

use super::constants::{
    TEST_ADMIN_EMAIL, TEST_ADMIN_NAME, TEST_ADMIN_PASSWORD, TEST_ENCRYPTION_SECRET,
    TEST_TOKEN_SECRET,
};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Token lifetime used by [`Self::auth_config`]
    pub const TTL_SECONDS: i64 = 3600;

    /// Auth configuration with plain-HTTP cookies, suitable for test requests
    #[must_use]
    pub fn auth_config() -> AuthConfig {
        AuthConfig {
            token_ttl: Self::TTL_SECONDS.to_string(),
            token_secret: TEST_TOKEN_SECRET.as_bytes().to_vec(),
            encryption_secret: TEST_ENCRYPTION_SECRET.as_bytes().to_vec(),
            cookie_secure: "false".to_string(),
            cookie_http_only: "true".to_string(),
            cookie_domain: String::new(),
            access_token_cookie: ACCESS_TOKEN_COOKIE.to_string(),
            authenticated_cookie: AUTHENTICATED_COOKIE.to_string(),
        }
    }

    /// Argon2 hash of [`TEST_ADMIN_PASSWORD`], computed once per test binary
    ///
    /// # Panics
    ///
    /// Panics if hashing fails.
    #[must_use]
    pub fn admin_password_hash() -> String {
        static HASH: OnceLock<String> = OnceLock::new();
        HASH.get_or_init(|| {
            password::hash(TEST_ADMIN_PASSWORD).expect("failed to hash test password")
        })
        .clone()
    }

    #[must_use]
    pub fn admin_user() -> StoredUser {
        StoredUser::new(TEST_ADMIN_EMAIL, TEST_ADMIN_NAME, Self::admin_password_hash())
    }

    /// Store holding only the active test administrator
    #[must_use]
    pub fn user_store() -> Arc<dyn UserStore> {
        Arc::new(InMemoryUserStore::new().with_user(Self::admin_user()))
    }

    #[must_use]
    pub fn gate() -> AuthenticationGate {
        AuthenticationGate::new(Self::auth_config(), Self::user_store())
    }
}
