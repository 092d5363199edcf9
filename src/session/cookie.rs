use actix_web::cookie::{time::Duration, time::OffsetDateTime, Cookie, SameSite};
use actix_web::HttpRequest;

use crate::auth::AuthError;

/// Default cookie names used when configuration leaves them unset
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const AUTHENTICATED_COOKIE: &str = "is_authenticated";

/// Value stored in the marker cookie while a session exists
pub const AUTHENTICATED_MARKER: &str = "true";

/// Cookie attributes resolved from deployment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub secure: bool,
    pub http_only: bool,
    pub domain: String,
    pub max_age_seconds: i64,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            domain: String::new(),
            max_age_seconds: 0,
        }
    }
}

/// The two cookies that make up a session
#[derive(Debug, Clone)]
pub struct SessionCookiePair {
    pub access_token: Cookie<'static>,
    pub authenticated: Cookie<'static>,
}

impl SessionCookiePair {
    #[must_use]
    pub fn into_vec(self) -> Vec<Cookie<'static>> {
        vec![self.access_token, self.authenticated]
    }
}

/// Parse a boolean configuration flag
///
/// Accepts `true`/`false`/`1`/`0`, case-insensitive, surrounding whitespace
/// ignored. Anything else is a configuration error rather than a silent
/// `false`, so a typo can never switch a protection off.
///
/// # Errors
///
/// Returns `ConfigurationInvalid` naming the flag but not its value.
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, AuthError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AuthError::ConfigurationInvalid(format!(
            "cookie {name} flag is not a boolean"
        ))),
    }
}

/// Cookie naming and scoping for the session pair
#[derive(Debug, Clone)]
pub struct SessionCookiePolicy {
    access_token_name: String,
    authenticated_name: String,
    domain: String,
}

impl SessionCookiePolicy {
    #[must_use]
    pub fn new(access_token_name: &str, authenticated_name: &str, domain: &str) -> Self {
        Self {
            access_token_name: access_token_name.to_string(),
            authenticated_name: authenticated_name.to_string(),
            domain: domain.trim().to_string(),
        }
    }

    /// Resolve the raw secure/http-only flags into attributes
    ///
    /// `max_age_seconds` is left at zero; callers writing a session set it
    /// from the token ttl.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationInvalid` if either flag is not boolean-parseable.
    pub fn resolve(&self, secure_raw: &str, http_only_raw: &str) -> Result<CookieAttributes, AuthError> {
        Ok(CookieAttributes {
            secure: parse_flag("secure", secure_raw)?,
            http_only: parse_flag("http-only", http_only_raw)?,
            domain: self.domain.clone(),
            max_age_seconds: 0,
        })
    }

    /// Secure, http-only attributes scoped to the configured domain
    ///
    /// Used when the configured flags cannot be parsed but the session still
    /// has to be cleared.
    #[must_use]
    pub fn fallback_attributes(&self) -> CookieAttributes {
        CookieAttributes {
            domain: self.domain.clone(),
            ..CookieAttributes::default()
        }
    }

    /// Build the session pair for an encrypted envelope
    ///
    /// Both cookies take their max-age and domain from `attrs`. The token
    /// cookie follows the configured http-only flag. The marker cookie is
    /// always readable by scripts so the admin UI can branch on it.
    #[must_use]
    pub fn write_session(&self, envelope: &str, attrs: &CookieAttributes) -> SessionCookiePair {
        let max_age = Duration::seconds(attrs.max_age_seconds);

        let access_token = Self::build(
            &self.access_token_name,
            envelope.to_string(),
            attrs.secure,
            attrs.http_only,
            max_age,
            &attrs.domain,
        );
        let authenticated = Self::build(
            &self.authenticated_name,
            AUTHENTICATED_MARKER.to_string(),
            attrs.secure,
            false,
            max_age,
            &attrs.domain,
        );

        log::debug!(
            "Writing session cookies: secure={}, http_only={}, max_age={}s",
            attrs.secure,
            attrs.http_only,
            attrs.max_age_seconds
        );

        SessionCookiePair {
            access_token,
            authenticated,
        }
    }

    /// Build an already-expired pair that overwrites both session cookies
    ///
    /// Name, path and domain (`attrs.domain`) match [`Self::write_session`]
    /// so browsers replace the live cookies. `attrs.max_age_seconds` is
    /// ignored. Repeating this is harmless.
    #[must_use]
    pub fn clear_session(&self, attrs: &CookieAttributes) -> SessionCookiePair {
        let mut access_token = Self::build(
            &self.access_token_name,
            String::new(),
            attrs.secure,
            attrs.http_only,
            Duration::ZERO,
            &attrs.domain,
        );
        access_token.set_expires(OffsetDateTime::UNIX_EPOCH);

        let mut authenticated = Self::build(
            &self.authenticated_name,
            String::new(),
            attrs.secure,
            false,
            Duration::ZERO,
            &attrs.domain,
        );
        authenticated.set_expires(OffsetDateTime::UNIX_EPOCH);

        SessionCookiePair {
            access_token,
            authenticated,
        }
    }

    /// Read the encrypted envelope from the request, if any
    #[must_use]
    pub fn read_envelope(&self, req: &HttpRequest) -> Option<String> {
        req.cookie(&self.access_token_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn build(
        name: &str,
        value: String,
        secure: bool,
        http_only: bool,
        max_age: Duration,
        domain: &str,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::build(name.to_owned(), value)
            .http_only(http_only)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .finish();

        if !domain.is_empty() {
            cookie.set_domain(domain.to_owned());
        }

        cookie
    }
}
