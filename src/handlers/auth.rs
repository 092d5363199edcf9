// Session handlers: login, logout and current-user lookup
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use log::debug;

use crate::auth::{AuthError, AuthenticationGate};
use crate::models::LoginRequest;
use crate::utils::responses::ResponseBuilder;

/// JSON extractor config mapping unreadable login bodies to `MalformedRequest`
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4096)
        .error_handler(|err: JsonPayloadError, _req| {
            debug!("Rejected request body: {err}");
            AuthError::MalformedRequest(err.to_string()).into()
        })
}

/// `POST /auth/login`
///
/// # Errors
/// Returns `MalformedRequest` for blank fields, otherwise whatever the gate
/// rejects the login with
pub async fn login(
    body: web::Json<LoginRequest>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AuthError> {
    let credentials = body.into_inner().into_credentials()?;
    let session = gate.login(&credentials).await?;

    Ok(ResponseBuilder::login_successful(session.into_vec()))
}

/// `POST /auth/logout`
///
/// Clears the session cookies whether or not a session exists.
pub async fn logout(gate: web::Data<AuthenticationGate>) -> HttpResponse {
    ResponseBuilder::logout_successful(gate.logout().into_vec())
}

/// `GET /auth/me`
///
/// # Errors
/// Returns `Unauthorized` when the request carries no valid session
pub async fn me(
    req: HttpRequest,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AuthError> {
    let envelope = gate.cookie_policy().read_envelope(&req);
    let identity = gate.me(envelope.as_deref()).await?;

    Ok(HttpResponse::Ok().json(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::configure_services;
    use crate::testing::{TestFixtures, TEST_ADMIN_EMAIL};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestFixtures::gate()))
                .configure(configure_services),
        )
        .await;

        for payload in [
            r"not json",
            r#"{"email":"admin@example.com"}"#,
            r#"{"email":"   ","password":"pw"}"#,
            r#"{"email":"admin@example.com","password":""}"#,
            r#"{"email":42,"password":"pw"}"#,
        ] {
            let req = test::TestRequest::post()
                .uri("/auth/login")
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {payload}");

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Invalid request body");
        }
    }

    #[actix_web::test]
    async fn test_me_without_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestFixtures::gate()))
                .configure(configure_services),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Unauthorized");
        assert!(!body.to_string().contains(TEST_ADMIN_EMAIL));
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_services)).await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
