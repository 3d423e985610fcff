//! Error types for the claim gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Gateway error type.
#[derive(Debug, Clone)]
pub enum Error {
    /// Configuration or deployment sanity check failed.
    Config(String),
    /// JSON-RPC transport or protocol error.
    Rpc(String),
    /// Contract call reverted. Carries the revert message.
    Reverted(String),
    /// Proof service unreachable or returned garbage.
    ProofService(String),
    /// Claim request rejected before submission.
    Validation(drop_types::ValidationError),
    /// Too many claim attempts for this wallet.
    RateLimited { retry_after_secs: u64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Reverted(msg) => write!(f, "execution reverted: {msg}"),
            Error::ProofService(msg) => write!(f, "proof service error: {msg}"),
            Error::Validation(e) => write!(f, "{e}"),
            Error::RateLimited { retry_after_secs } => {
                write!(f, "too many claim attempts, retry in {retry_after_secs}s")
            }
        }
    }
}

impl Error {
    /// Payload without the category prefix. Classifiers match on this.
    pub fn message(&self) -> String {
        match self {
            Error::Config(msg)
            | Error::Rpc(msg)
            | Error::Reverted(msg)
            | Error::ProofService(msg) => msg.clone(),
            Error::Validation(_) | Error::RateLimited { .. } => self.to_string(),
        }
    }
}

impl std::error::Error for Error {}


impl From<drop_types::ValidationError> for Error {
    fn from(e: drop_types::ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Rpc(_) | Error::ProofService(_) => StatusCode::BAD_GATEWAY,
            Error::Reverted(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
