use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;

/// Gateway error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Apply outcomes are not errors; they come back as `ApplyResolution` bodies.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Backend(e) => {
                tracing::error!("Backend error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_ERROR",
                    "The job board backend could not complete the request".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Rejects blank path/body identifiers before any backend call.
pub fn require_user_id(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    Ok(trimmed)
}
