use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::session::{ACCESS_TOKEN_COOKIE, AUTHENTICATED_COOKIE};
use crate::utils::crypto::generate_secret;

/// Directory holding a deployment-specific `Settings.toml`
pub const SECRETS_DIR_ENV: &str = "CATALOG_SECRETS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminSettings {
    pub application: ApplicationSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
    pub admin: AdminUserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Token lifetime as written in configuration, e.g. `3600`, `90m`, `1d`
    pub token_ttl: String,
    pub token_secret: String,
    pub encryption_secret: String,
}

/// Cookie flags are kept raw and parsed when a session is written, so a bad
/// value surfaces as a configuration error instead of a silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: String,
    pub http_only: String,
    pub domain: String,
    pub access_token_name: String,
    pub authenticated_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

/// The bootstrap administrator account
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminUserSettings {
    pub email: String,
    pub name: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Plaintext fallback, hashed at start-up
    pub password: String,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("token_ttl", &self.token_ttl)
            .field("token_secret", &"[REDACTED]")
            .field("encryption_secret", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for AdminUserSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUserSettings")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_ttl: "24h".to_string(),
            token_secret: String::new(),      // Will be generated if empty
            encryption_secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: "true".to_string(),
            http_only: "true".to_string(),
            domain: String::new(),
            access_token_name: ACCESS_TOKEN_COOKIE.to_string(),
            authenticated_name: AUTHENTICATED_COOKIE.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AdminSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Self::initialize_logging(&settings.logging)?;
        Self::ensure_secrets(&mut settings.session);

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `CATALOG_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = Path::new("Settings.toml");
        if default_config_path.exists() {
            settings = Self::load_file(default_config_path)?;
            println!("✓ Loaded base settings from {}", default_config_path.display());
        }

        if let Ok(secrets_dir) = std::env::var(SECRETS_DIR_ENV) {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::load_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ {SECRETS_DIR_ENV} set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a single TOML settings file; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn load_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    fn initialize_logging(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(logging.level.as_str()),
        )
        .try_init()?;
        Ok(())
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
        Self::apply_admin_env_overrides(&mut settings.admin);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        Self::apply_string_env_override("HOST", &mut app_settings.host);
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        Self::apply_string_env_override("CORS_ORIGINS", &mut app_settings.cors_origins);
    }

    fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        Self::apply_string_env_override("TOKEN_TTL", &mut session_settings.token_ttl);
        Self::apply_secret_env_override("TOKEN_SECRET", &mut session_settings.token_secret);
        Self::apply_secret_env_override(
            "ENCRYPTION_SECRET",
            &mut session_settings.encryption_secret,
        );
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        Self::apply_string_env_override("COOKIE_SECURE", &mut cookie_settings.secure);
        Self::apply_string_env_override("COOKIE_HTTP_ONLY", &mut cookie_settings.http_only);
        Self::apply_string_env_override("COOKIE_DOMAIN", &mut cookie_settings.domain);
        Self::apply_string_env_override(
            "ACCESS_TOKEN_COOKIE",
            &mut cookie_settings.access_token_name,
        );
        Self::apply_string_env_override(
            "AUTHENTICATED_COOKIE",
            &mut cookie_settings.authenticated_name,
        );
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        Self::apply_string_env_override("RUST_LOG", &mut logging_settings.level);
    }

    fn apply_admin_env_overrides(admin_settings: &mut AdminUserSettings) {
        Self::apply_string_env_override("ADMIN_EMAIL", &mut admin_settings.email);
        Self::apply_string_env_override("ADMIN_NAME", &mut admin_settings.name);
        Self::apply_secret_env_override("ADMIN_PASSWORD_HASH", &mut admin_settings.password_hash);
        Self::apply_secret_env_override("ADMIN_PASSWORD", &mut admin_settings.password);
    }

    fn apply_string_env_override(env_var: &str, target: &mut String) {
        if let Ok(value) = std::env::var(env_var) {
            *target = value;
        }
    }

    /// An empty secret in the environment does not clear a configured one
    fn apply_secret_env_override(env_var: &str, target: &mut String) {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                *target = value;
            }
        }
    }

    /// Replace empty session secrets with random ones
    pub fn ensure_secrets(session_settings: &mut SessionSettings) {
        for (name, secret) in [
            ("TOKEN_SECRET", &mut session_settings.token_secret),
            ("ENCRYPTION_SECRET", &mut session_settings.encryption_secret),
        ] {
            if secret.is_empty() {
                *secret = generate_secret();
                Self::warn_about_generated_secret(name);
            }
        }
    }

    fn warn_about_generated_secret(env_var: &str) {
        log::warn!("⚠️  WARNING: Using auto-generated {env_var}");
        log::warn!("🔒 For production use, set the {env_var} environment variable or configure it in Settings.toml");
        log::warn!("💡 Sessions will not survive a restart unless the secret is explicitly configured");
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: &[&str] = &[
        "HOST",
        "PORT",
        "CORS_ORIGINS",
        "TOKEN_TTL",
        "TOKEN_SECRET",
        "ENCRYPTION_SECRET",
        "COOKIE_SECURE",
        "COOKIE_HTTP_ONLY",
        "COOKIE_DOMAIN",
        "ACCESS_TOKEN_COOKIE",
        "AUTHENTICATED_COOKIE",
        "ADMIN_EMAIL",
        "ADMIN_NAME",
        "ADMIN_PASSWORD_HASH",
        "ADMIN_PASSWORD",
        SECRETS_DIR_ENV,
    ];

    fn clean_env_vars() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = AdminSettings::default();
        assert_eq!(settings.session.token_ttl, "24h");
        assert!(settings.session.token_secret.is_empty());
        assert_eq!(settings.cookies.secure, "true");
        assert_eq!(settings.cookies.http_only, "true");
        assert_eq!(settings.cookies.access_token_name, ACCESS_TOKEN_COOKIE);
        assert_eq!(settings.cookies.authenticated_name, AUTHENTICATED_COOKIE);
        assert_eq!(settings.get_bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_cors_origins_split() {
        let mut settings = AdminSettings::default();
        settings.application.cors_origins = " https://a.example , https://b.example,".to_string();
        assert_eq!(
            settings.get_cors_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut settings = AdminSettings::default();
        settings.session.token_secret = "super-secret-signing".to_string();
        settings.admin.password = "hunter2".to_string();

        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret-signing"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clean_env_vars();
        std::env::set_var("TOKEN_TTL", "90m");
        std::env::set_var("COOKIE_SECURE", "false");
        std::env::set_var("COOKIE_DOMAIN", "admin.example.com");
        std::env::set_var("ADMIN_EMAIL", "ops@example.com");
        std::env::set_var("PORT", "not-a-port");

        let mut settings = AdminSettings::default();
        AdminSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.session.token_ttl, "90m");
        assert_eq!(settings.cookies.secure, "false");
        assert_eq!(settings.cookies.domain, "admin.example.com");
        assert_eq!(settings.admin.email, "ops@example.com");
        assert_eq!(settings.application.port, 8080);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_secret_env_does_not_clear_configured_secret() {
        clean_env_vars();
        std::env::set_var("TOKEN_SECRET", "");

        let mut settings = AdminSettings::default();
        settings.session.token_secret = "configured".to_string();
        AdminSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.session.token_secret, "configured");

        clean_env_vars();
    }

    #[test]
    fn test_secret_auto_generation() {
        let mut first = SessionSettings::default();
        AdminSettings::ensure_secrets(&mut first);
        assert!(first.token_secret.len() > 40);
        assert!(first.encryption_secret.len() > 40);
        assert_ne!(first.token_secret, first.encryption_secret);

        let mut second = SessionSettings::default();
        AdminSettings::ensure_secrets(&mut second);
        assert_ne!(first.token_secret, second.token_secret);

        let mut configured = SessionSettings {
            token_ttl: "1h".to_string(),
            token_secret: "keep-me".to_string(),
            encryption_secret: "keep-me-too".to_string(),
        };
        AdminSettings::ensure_secrets(&mut configured);
        assert_eq!(configured.token_secret, "keep-me");
        assert_eq!(configured.encryption_secret, "keep-me-too");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[session]
token_ttl = "2h"

[cookies]
http_only = "false"
domain = "admin.example.com"

[admin]
email = "admin@example.com"
name = "Admin"
"#
        )
        .unwrap();

        let settings = AdminSettings::load_file(file.path()).unwrap();
        assert_eq!(settings.session.token_ttl, "2h");
        assert_eq!(settings.cookies.http_only, "false");
        assert_eq!(settings.cookies.secure, "true");
        assert_eq!(settings.cookies.domain, "admin.example.com");
        assert_eq!(settings.admin.email, "admin@example.com");
        assert_eq!(settings.application.port, 8080);
    }

    #[test]
    #[serial]
    fn test_secrets_dir_overrides_base_file() {
        clean_env_vars();
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Settings.toml"),
            "[session]\ntoken_ttl = \"15m\"\n",
        )
        .unwrap();
        std::env::set_var(SECRETS_DIR_ENV, dir.path());

        let settings = AdminSettings::load_base_settings().unwrap();
        assert_eq!(settings.session.token_ttl, "15m");

        clean_env_vars();
    }

    #[test]
    fn test_load_file_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\ntoken_ttl = ").unwrap();

        assert!(AdminSettings::load_file(file.path()).is_err());
    }
}
