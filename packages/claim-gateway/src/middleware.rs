//! Authentication and request correlation middleware.

use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

pub const API_KEY_ENV: &str = "CLAIM_GATEWAY_API_KEY";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Cached API key from env. `None` = dev mode (no auth).
static API_KEY: OnceLock<Option<String>> = OnceLock::new();

fn expected_api_key() -> &'static Option<String> {
    API_KEY.get_or_init(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
}

/// Validate `X-Api-Key` or `Authorization: Bearer` header.
/// Bypassed if `CLAIM_GATEWAY_API_KEY` is unset (dev mode).
pub async fn api_key_auth(request: Request, next: Next) -> Response {
    let expected = match expected_api_key() {
        Some(key) => key,
        None => return next.run(request).await,
    };

    if key_matches(provided_key(&request), expected) {
        next.run(request).await
    } else {
        let body = serde_json::json!({
            "success": false,
            "error": "Unauthorized: invalid or missing API key"
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn provided_key(request: &Request) -> Option<&str> {
    let headers = request.headers();
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn key_matches(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(key) => key.len() == expected.len() && key.as_bytes().ct_eq(expected.as_bytes()).into(),
        None => false,
    }
}

/// Request correlation ID, available to handlers as `Extension<RequestId>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Propagate or generate `x-request-id`, expose it to handlers and echo it.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(&request)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);
    let header = HeaderValue::from_str(&request_id).ok();
    request.extensions_mut().insert(RequestId(request_id));

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_request_id(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

fn generate_request_id() -> String {
    use rand::Rng;
    format!("clm-{:016x}", rand::thread_rng().gen::<u64>())
}
