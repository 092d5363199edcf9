#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use catalog_admin::{
    auth::{AuthConfig, AuthenticationGate},
    handlers::configure_services,
    settings::AdminSettings,
    users::InMemoryUserStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = AdminSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    // A bad TTL or cookie flag would otherwise only show up on the first login
    let auth_config = AuthConfig::from_settings(&settings);
    auth_config
        .validate()
        .map_err(|e| std::io::Error::other(format!("Invalid session configuration: {e}")))?;

    let users = InMemoryUserStore::from_admin_settings(&settings.admin)
        .map_err(|e| std::io::Error::other(format!("Failed to load administrator: {e}")))?;

    let gate = AuthenticationGate::new(auth_config, Arc::new(users));

    start_server(gate, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(gate: AuthenticationGate, settings: AdminSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let gate = web::Data::new(gate);
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(gate.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &AdminSettings) {
    println!("Starting Catalog Admin API on http://{bind_address}");
    println!("Session: encrypted cookies, ttl {}", settings.session.token_ttl);
    println!();
    println!("Session endpoints:");
    println!("  POST /auth/login   - Sign in with email and password");
    println!("  POST /auth/logout  - Clear session cookies");
    println!("  GET  /auth/me      - Current administrator");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping         - Health check");
    println!();
    println!("CORS origins: {}", settings.get_cors_origins().join(", "));
}
