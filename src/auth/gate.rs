//! Login, logout and identity checks
//!
//! [`AuthenticationGate`] wires the credential verifier, token issuer, token
//! cipher and cookie policy together. It is built once at start-up from an
//! immutable [`AuthConfig`] and shared across workers.

use std::sync::Arc;

use crate::auth::{AuthError, CredentialVerifier};
use crate::models::{Credentials, UserIdentity};
use crate::session::{
    parse_flag, parse_ttl, CookieAttributes, SessionCookiePair, SessionCookiePolicy, TokenCipher,
    TokenIssuer,
};
use crate::settings::AdminSettings;
use crate::users::UserStore;

/// Configuration consumed by the gate
///
/// TTL and cookie flags are kept as written and parsed on every login, so a
/// broken value fails that request with `ConfigurationInvalid` rather than
/// falling back to a default. [`AuthConfig::validate`] runs the same parsing
/// once at start-up.
#[derive(Clone)]
pub struct AuthConfig {
    pub token_ttl: String,
    pub token_secret: Vec<u8>,
    pub encryption_secret: Vec<u8>,
    pub cookie_secure: String,
    pub cookie_http_only: String,
    pub cookie_domain: String,
    pub access_token_cookie: String,
    pub authenticated_cookie: String,
}

impl AuthConfig {
    #[must_use]
    pub fn from_settings(settings: &AdminSettings) -> Self {
        Self {
            token_ttl: settings.session.token_ttl.clone(),
            token_secret: settings.session.token_secret.as_bytes().to_vec(),
            encryption_secret: settings.session.encryption_secret.as_bytes().to_vec(),
            cookie_secure: settings.cookies.secure.clone(),
            cookie_http_only: settings.cookies.http_only.clone(),
            cookie_domain: settings.cookies.domain.clone(),
            access_token_cookie: settings.cookies.access_token_name.clone(),
            authenticated_cookie: settings.cookies.authenticated_name.clone(),
        }
    }

    /// Check everything a login would parse
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` for an unparseable TTL or cookie flag,
    /// a missing secret or an empty cookie name.
    pub fn validate(&self) -> Result<(), AuthError> {
        parse_ttl(&self.token_ttl)?;
        parse_flag("secure", &self.cookie_secure)?;
        parse_flag("http-only", &self.cookie_http_only)?;

        if self.token_secret.is_empty() {
            return Err(AuthError::ConfigurationInvalid(
                "token signing secret is not configured".into(),
            ));
        }
        if self.encryption_secret.is_empty() {
            return Err(AuthError::ConfigurationInvalid(
                "cookie encryption secret is not configured".into(),
            ));
        }
        if self.access_token_cookie.trim().is_empty() || self.authenticated_cookie.trim().is_empty()
        {
            return Err(AuthError::ConfigurationInvalid(
                "session cookie names must not be empty".into(),
            ));
        }
        if self.access_token_cookie == self.authenticated_cookie {
            return Err(AuthError::ConfigurationInvalid(
                "session cookie names must differ".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct AuthenticationGate {
    config: Arc<AuthConfig>,
    verifier: CredentialVerifier,
    issuer: TokenIssuer,
    cipher: TokenCipher,
    cookies: SessionCookiePolicy,
    users: Arc<dyn UserStore>,
}

impl AuthenticationGate {
    #[must_use]
    pub fn new(config: AuthConfig, users: Arc<dyn UserStore>) -> Self {
        let issuer = TokenIssuer::new(&config.token_secret);
        let cipher = TokenCipher::new(&config.encryption_secret);
        let cookies = SessionCookiePolicy::new(
            &config.access_token_cookie,
            &config.authenticated_cookie,
            &config.cookie_domain,
        );

        Self {
            config: Arc::new(config),
            verifier: CredentialVerifier::new(Arc::clone(&users)),
            issuer,
            cipher,
            cookies,
            users,
        }
    }

    #[must_use]
    pub fn cookie_policy(&self) -> &SessionCookiePolicy {
        &self.cookies
    }

    /// Authenticate and build the session cookies
    ///
    /// Nothing is returned until every step has succeeded, so a failure never
    /// leaves a half-written session behind.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error: `AuthenticationFailed`,
    /// `ConfigurationInvalid`, `TokenCreationFailed` or `EncryptionFailed`.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionCookiePair, AuthError> {
        match self.establish_session(credentials).await {
            Ok(pair) => Ok(pair),
            Err(error) if error.is_server_fault() => {
                log::error!("❌ Login aborted by server fault: {error}");
                Err(error)
            }
            Err(error) => {
                log::warn!("Login rejected");
                Err(error)
            }
        }
    }

    async fn establish_session(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionCookiePair, AuthError> {
        let identity = self.verifier.verify(credentials).await?;

        let ttl = parse_ttl(&self.config.token_ttl)?;
        let attrs = CookieAttributes {
            max_age_seconds: ttl,
            ..self
                .cookies
                .resolve(&self.config.cookie_secure, &self.config.cookie_http_only)?
        };

        let token = self.issuer.issue(identity.id, ttl)?;
        let envelope = self.cipher.encrypt(&token)?;

        log::info!("✅ Session established for user {}", identity.id);
        Ok(self.cookies.write_session(&envelope, &attrs))
    }

    /// Build the cookies that end the session
    ///
    /// Always succeeds. A broken flag configuration falls back to secure,
    /// http-only attributes on the configured domain since the cookies carry
    /// no value anyway.
    #[must_use]
    pub fn logout(&self) -> SessionCookiePair {
        let attrs = self
            .cookies
            .resolve(&self.config.cookie_secure, &self.config.cookie_http_only)
            .unwrap_or_else(|error| {
                log::error!("❌ Cookie configuration invalid during logout: {error}");
                self.cookies.fallback_attributes()
            });

        self.cookies.clear_session(&attrs)
    }

    /// Resolve the session envelope to the signed-in user
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for every failure; the underlying cause is
    /// logged at debug level only.
    pub async fn me(&self, envelope: Option<&str>) -> Result<UserIdentity, AuthError> {
        self.identify(envelope).await.map_err(|error| {
            log::debug!("Identity check rejected: {error}");
            AuthError::Unauthorized(error.to_string())
        })
    }

    async fn identify(&self, envelope: Option<&str>) -> Result<UserIdentity, AuthError> {
        let envelope =
            envelope.ok_or_else(|| AuthError::Unauthorized("no session cookie".into()))?;

        let token = self.cipher.decrypt(envelope)?;
        let claims = self.issuer.validate(&token)?;

        self.users
            .find_by_id(claims.subject)
            .await
            .ok_or_else(|| AuthError::Unauthorized("session subject no longer active".into()))
    }
}
