//! Shared test fixtures
//!
//! Compiled for unit tests and behind the `testing` feature.
//!
//! ```rust,ignore
//! use catalog_admin::testing::{TestFixtures, TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD};
//!
//! let gate = TestFixtures::gate();
//! ```

pub mod fixtures;

pub use constants::*;
pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    pub const TEST_ADMIN_EMAIL: &str = "admin@example.com";
    pub const TEST_ADMIN_NAME: &str = "Catalog Admin";
    pub const TEST_ADMIN_PASSWORD: &str = "correct horse battery staple";

    pub const TEST_TOKEN_SECRET: &str = "test_token_signing_secret_at_least_32_bytes";
    pub const TEST_ENCRYPTION_SECRET: &str = "test_cookie_encryption_secret_32_bytes";
}
