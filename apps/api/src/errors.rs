use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Analyze could not obtain a usable classification. Nothing was persisted.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Audit could not obtain a usable reconciliation. The record is unchanged.
    #[error("Audit error: {0}")]
    Audit(String),

    /// An interview turn could not be generated.
    #[error("Interview error: {0}")]
    Interview(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Classification(_)
            | AppError::Audit(_)
            | AppError::Interview(_)
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone()),
            AppError::Classification(msg) => {
                tracing::error!("Classification error: {msg}");
                ("CLASSIFICATION_ERROR", msg.clone())
            }
            AppError::Audit(msg) => {
                tracing::error!("Audit error: {msg}");
                ("AUDIT_ERROR", msg.clone())
            }
            AppError::Interview(msg) => {
                tracing::error!("Interview error: {msg}");
                (
                    "INTERVIEW_ERROR",
                    "The interviewer could not produce a reply".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                ("STORAGE_ERROR", "A storage error occurred".to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
