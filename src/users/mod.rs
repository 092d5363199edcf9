//! Administrator accounts: password hashing and the user store seam

pub mod password;
pub mod store;

pub use store::{generate_user_id, InMemoryUserStore, StoredUser, UserStore};
