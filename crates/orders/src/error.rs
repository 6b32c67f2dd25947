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

/// Message for an order id with no row behind it.
pub const ORDER_NOT_FOUND: &str = "Pedido no encontrado";

/// Application-level error type for the order service.
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

    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::InvalidInput(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
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
                Self::Database(RepositoryError::NotFound) => ORDER_NOT_FOUND.to_string(),
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_repository_not_found_uses_order_message() {
        let (status, body) = render(AppError::Database(RepositoryError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], ORDER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_input_is_400_with_message() {
        let (status, body) = render(AppError::Database(RepositoryError::InvalidInput(
            "El término de búsqueda debe tener al menos 2 caracteres".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "El término de búsqueda debe tener al menos 2 caracteres"
        );
    }

    #[tokio::test]
    async fn test_data_corruption_is_500_with_details() {
        let (status, body) = render(AppError::Database(RepositoryError::DataCorruption(
            "bad row".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_ERROR);
        assert!(body["details"].as_str().unwrap().contains("bad row"));
    }
}
