use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Startup failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Core(#[from] floodway_core::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request failures, rendered as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Core(#[from] floodway_core::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        use floodway_core::Error as Core;

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(Core::InvalidPoint { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Core(Core::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(Core::UpstreamUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
