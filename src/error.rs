// Error handling for the seeder's HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::fmt;

use crate::backend::BackendError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The backend could not be reached or rejected the service credentials
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadGateway(msg) => write!(f, "Backend unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}
