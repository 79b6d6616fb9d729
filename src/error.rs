use std::time::Duration;

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of a single call to the hosted model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
    #[error("request timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("generation failed after {attempts} attempts: {last_error}")]
    GenerationFailed { attempts: u32, last_error: String },
    #[error("image analysis failed: {0}")]
    AnalysisFailed(String),
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("route not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Generation(GenerationError::InvalidRequest(_)) | AppError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": { "message": self.to_string() },
        }));
        (status, body).into_response()
    }
}
