//! Administrator user records
//!
//! The catalog's user table lives outside the session core; the core only
//! needs to find a user by login email and to resolve a token subject back to
//! a profile. [`UserStore`] is that seam, [`InMemoryUserStore`] the
//! implementation seeded from settings at start-up.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::UserIdentity;
use crate::settings::AdminUserSettings;
use crate::users::password;

/// Fixed namespace for deriving administrator ids from their email
const USER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6ba7_b814_9dad_11d1_80b4_00c0_4fd4_30c8);

/// A user as held by the store, including the password hash
#[derive(Clone, Debug)]
pub struct StoredUser {
    pub identity: UserIdentity,
    pub password_hash: String,
    pub active: bool,
}

impl StoredUser {
    /// Build an active user with an id derived from the email
    #[must_use]
    pub fn new(email: &str, name: &str, password_hash: String) -> Self {
        Self {
            identity: UserIdentity {
                id: generate_user_id(email),
                email: email.trim().to_string(),
                name: name.to_string(),
            },
            password_hash,
            active: true,
        }
    }

    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Generate a stable `UUIDv5` for an email address
#[must_use]
pub fn generate_user_id(email: &str) -> Uuid {
    Uuid::new_v5(&USER_ID_NAMESPACE, normalize_email(email).as_bytes())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lookup contract the authentication core depends on
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by login email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Option<StoredUser>;

    /// Resolve an active user's public profile by id
    async fn find_by_id(&self, id: Uuid) -> Option<UserIdentity>;
}

/// Immutable in-memory store, built once at start-up
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    by_id: HashMap<Uuid, StoredUser>,
    id_by_email: HashMap<String, Uuid>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, replacing any existing user with the same email
    #[must_use]
    pub fn with_user(mut self, user: StoredUser) -> Self {
        self.id_by_email
            .insert(normalize_email(&user.identity.email), user.identity.id);
        self.by_id.insert(user.identity.id, user);
        self
    }

    /// Seed the store with the configured administrator
    ///
    /// A plaintext `password` is hashed here and a warning is logged; a
    /// `password_hash` must already be a PHC string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No email is configured
    /// - Neither a password nor a password hash is configured
    /// - The configured hash is not a PHC string
    /// - Hashing the plaintext password fails
    pub fn from_admin_settings(admin: &AdminUserSettings) -> Result<Self> {
        if admin.email.trim().is_empty() {
            return Err(anyhow!("admin.email must be configured"));
        }

        let password_hash = if !admin.password_hash.is_empty() {
            if !password::is_phc(&admin.password_hash) {
                return Err(anyhow!("admin.password_hash is not a valid PHC string"));
            }
            admin.password_hash.clone()
        } else if !admin.password.is_empty() {
            log::warn!("⚠️  Administrator password configured in plaintext; set admin.password_hash instead");
            password::hash(&admin.password).map_err(|e| anyhow!("Failed to hash admin password: {e}"))?
        } else {
            return Err(anyhow!(
                "admin.password_hash or admin.password must be configured"
            ));
        };

        let user = StoredUser::new(&admin.email, &admin.name, password_hash);
        log::info!("✅ Administrator account loaded (id {})", user.identity.id);

        Ok(Self::new().with_user(user))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        self.id_by_email
            .get(&normalize_email(email))
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }

    async fn find_by_id(&self, id: Uuid) -> Option<UserIdentity> {
        self.by_id
            .get(&id)
            .filter(|user| user.active)
            .map(|user| user.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_settings() -> AdminUserSettings {
        AdminUserSettings {
            email: "Admin@Example.com".to_string(),
            name: "Admin".to_string(),
            password_hash: String::new(),
            password: "correct".to_string(),
        }
    }

    #[test]
    fn test_user_id_is_stable_and_case_insensitive() {
        assert_eq!(
            generate_user_id("admin@example.com"),
            generate_user_id(" ADMIN@example.com ")
        );
        assert_ne!(
            generate_user_id("admin@example.com"),
            generate_user_id("editor@example.com")
        );
    }

    #[actix_web::test]
    async fn test_find_by_email_and_id() {
        let user = StoredUser::new("admin@example.com", "Admin", "hash".to_string());
        let id = user.identity.id;
        let store = InMemoryUserStore::new().with_user(user);

        let found = store.find_by_email("ADMIN@example.com").await.unwrap();
        assert_eq!(found.identity.id, id);
        assert_eq!(store.find_by_id(id).await.unwrap().email, "admin@example.com");
        assert!(store.find_by_email("nobody@example.com").await.is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.is_none());
    }

    #[actix_web::test]
    async fn test_inactive_user_has_no_identity() {
        let user = StoredUser::new("old@example.com", "Old", "hash".to_string()).deactivated();
        let id = user.identity.id;
        let store = InMemoryUserStore::new().with_user(user);

        assert!(store.find_by_email("old@example.com").await.is_some());
        assert!(store.find_by_id(id).await.is_none());
    }

    #[actix_web::test]
    async fn test_from_admin_settings_hashes_plaintext() {
        let store = InMemoryUserStore::from_admin_settings(&admin_settings()).unwrap();
        assert_eq!(store.len(), 1);

        let user = store.find_by_email("admin@example.com").await.unwrap();
        assert!(password::verify("correct", &user.password_hash));
        assert_eq!(user.identity.email, "Admin@Example.com");
    }

    #[test]
    fn test_from_admin_settings_accepts_phc_hash() {
        let mut settings = admin_settings();
        settings.password = String::new();
        settings.password_hash = password::hash("correct").unwrap();

        assert!(InMemoryUserStore::from_admin_settings(&settings).is_ok());
    }

    #[test]
    fn test_from_admin_settings_rejects_incomplete_config() {
        let mut no_email = admin_settings();
        no_email.email = "  ".to_string();
        assert!(InMemoryUserStore::from_admin_settings(&no_email).is_err());

        let mut no_secret = admin_settings();
        no_secret.password = String::new();
        assert!(InMemoryUserStore::from_admin_settings(&no_secret).is_err());

        let mut bad_hash = admin_settings();
        bad_hash.password_hash = "plaintext".to_string();
        let error = InMemoryUserStore::from_admin_settings(&bad_hash).err().unwrap();
        assert!(error.to_string().contains("PHC"));
    }
}
