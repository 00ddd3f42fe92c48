//! Error types for the storefront API
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;

// == App Error Enum ==
/// Errors that reach the HTTP layer.
///
/// Cache and rate-limiter failures never appear here; they are absorbed
/// where they happen.
#[derive(Error, Debug)]
pub enum AppError {
    /// Query or body failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Product database failure
    #[error(transparent)]
    Database(#[from] CatalogError),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Not found: {what}") }),
            ),
            AppError::Database(_) | AppError::Internal(_) => {
                // Detail stays in the logs
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
