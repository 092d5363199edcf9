//! Session authentication: credential checks, the login/logout/me gate and
//! the error taxonomy shared by every component

pub mod credentials;
pub mod errors;
pub mod gate;

pub use credentials::CredentialVerifier;
pub use errors::AuthError;
pub use gate::{AuthConfig, AuthenticationGate};
