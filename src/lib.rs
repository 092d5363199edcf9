#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the catalog-admin application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod auth;
pub mod handlers;
pub mod models;
pub mod session;
pub mod settings;
pub mod users;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use auth::{AuthConfig, AuthError, AuthenticationGate};
pub use handlers::configure_services;
pub use settings::AdminSettings;
pub use users::{InMemoryUserStore, UserStore};
