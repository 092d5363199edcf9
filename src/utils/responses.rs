//! HTTP response helpers
//!
//! Every JSON body this service emits outside of resource payloads is the
//! `{"message": "..."}` envelope. The handful of fixed bodies are serialized
//! once and reused.

use actix_web::{cookie::Cookie, http::header, http::StatusCode, HttpResponse};
use serde::Serialize;

// ===============================
// CACHED RESPONSES FOR PERFORMANCE
// ===============================

/// Global instance of pre-serialized common responses for performance
static CACHED_RESPONSES: std::sync::LazyLock<CachedResponses> =
    std::sync::LazyLock::new(CachedResponses::new);

/// Container for pre-serialized common HTTP response bodies
struct CachedResponses {
    login_successful: String,
    logout_successful: String,
}

impl CachedResponses {
    fn new() -> Self {
        Self {
            login_successful: message_json("Login successful"),
            logout_successful: message_json("Logout successful"),
        }
    }
}

/// Message envelope used for both success and error bodies
#[derive(Debug, Serialize)]
pub struct MessageResponse<'a> {
    pub message: &'a str,
}

fn message_json(message: &str) -> String {
    serde_json::to_string(&MessageResponse { message })
        .unwrap_or_else(|_| String::from(r#"{"message":""}"#))
}

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// `{"message": ...}` body with the given status
    #[must_use]
    pub fn message(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(message_json(message))
    }

    /// 200 login success carrying the session cookies
    #[must_use]
    pub fn login_successful(cookies: Vec<Cookie<'static>>) -> HttpResponse {
        Self::ok_with_cookies(CACHED_RESPONSES.login_successful.clone(), cookies)
    }

    /// 200 logout success carrying the clearing cookies
    #[must_use]
    pub fn logout_successful(cookies: Vec<Cookie<'static>>) -> HttpResponse {
        Self::ok_with_cookies(CACHED_RESPONSES.logout_successful.clone(), cookies)
    }

    fn ok_with_cookies(body: String, cookies: Vec<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_message_envelope() {
        let response = ResponseBuilder::message(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(body.as_ref(), br#"{"message":"nope"}"#);
    }

    #[test]
    fn test_login_success_carries_cookies() {
        let response = ResponseBuilder::login_successful(vec![
            Cookie::new("a", "1"),
            Cookie::new("b", "2"),
        ]);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.cookies().count(), 2);
    }
}
