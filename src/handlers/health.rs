use actix_web::{HttpResponse, Result};

use crate::models::HealthResponse;

/// Health check endpoint
///
/// # Errors
/// This function currently never returns an error
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Catalog admin API is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}
