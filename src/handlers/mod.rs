// HTTP request handlers for the admin session endpoints
pub mod auth;
pub mod health;

use actix_web::web;

pub use auth::{json_config, login, logout, me};
pub use health::health;

/// Register the session and health routes
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/auth/login", web::post().to(login))
        .route("/auth/logout", web::post().to(logout))
        .route("/auth/me", web::get().to(me))
        .route("/ping", web::get().to(health));
}
