use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Server misconfigured.")]
    Misconfigured,

    #[error("{0}")]
    Upstream(String),
}

/// Transport-level failures from the outbound vision call (DNS, connect,
/// reset mid-body) surface as 502 like any other upstream fault.
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Misconfigured => {
                tracing::error!("Vision endpoint or key is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server misconfigured.".into(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream vision call failed: {msg}");
                (StatusCode::BAD_GATEWAY, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
