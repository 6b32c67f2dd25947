//! Unified error handling with Sentry integration.
//!
//! Every failure renders as a JSON [`Envelope`] with `success: false`. Server
//! errors are captured to Sentry before responding.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use registry_core::Envelope;

use crate::db::RepositoryError;

/// Client-facing message for any 500.
pub const INTERNAL_ERROR: &str = "Error interno del servidor";

/// Application-level error type for the user service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Cuerpo JSON inválido: {}", rejection.body_text()))
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err) => err.is_internal(),
            Self::Internal(_) => true,
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            Envelope::failure(INTERNAL_ERROR, Some(self.to_string()))
        } else {
            let message = match self {
                Self::Database(RepositoryError::NotFound) => "Usuario no encontrado".to_string(),
                Self::Database(
                    RepositoryError::Conflict(msg) | RepositoryError::InvalidInput(msg),
                )
                | Self::NotFound(msg)
                | Self::BadRequest(msg) => msg,
                other => other.to_string(),
            };
            Envelope::failure(message, None)
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
