//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies every request failure into one enum that converts
//! into a JSON `{"error", "status"}` response via [`IntoResponse`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use safetynet_store::StoreError;
use tokio::task::JoinError;
use validator::ValidationErrors;

/// Errors that can occur while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The record named by the request does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body is malformed or fails validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A query parameter is missing or malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Reloading the stores from disk failed.
    #[error("reload failed: {0}")]
    Reload(#[from] StoreError),

    /// The blocking task running a store mutation panicked or was cancelled.
    #[error("mutation task failed: {0}")]
    Worker(#[from] JoinError),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidPayload(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Reload(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidPayload(errors.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(msg) | Self::InvalidPayload(msg) | Self::InvalidQuery(msg) => {
                msg.clone()
            }
            Self::Reload(e) => e.to_string(),
            Self::Worker(e) => e.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
