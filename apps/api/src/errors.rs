use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::assembler::AssemblyError;
use crate::profile::validation::FieldError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Document assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a single field-level validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "One or more fields are invalid".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Assembly(e) => {
                tracing::warn!("Document assembly failed: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "ASSEMBLY_ERROR",
                    e.to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Pdf(msg) => {
                tracing::error!("PDF error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF_ERROR",
                    "The document could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = match &self {
            AppError::Validation(fields) => Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "fields": fields
                }
            })),
            _ => Json(json!({
                "error": {
                    "code": code,
                    "message": message
                }
            })),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::invalid("national_id", "must be 10 digits").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_assembly_maps_to_unprocessable() {
        let err = AppError::from(AssemblyError::MissingField("profile.birth_date".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("Profile x not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
