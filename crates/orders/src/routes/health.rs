//! Liveness and readiness endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use registry_core::Envelope;

use crate::state::AppState;

/// Liveness health check.
///
/// Reports the configured user service URL without calling it.
pub async fn health(State(state): State<AppState>) -> Json<Envelope<()>> {
    Json(
        Envelope::notice("Servicio de pedidos funcionando correctamente")
            .with_meta("timestamp", Utc::now().to_rfc3339())
            .with_meta("user_service", state.user_service_url()),
    )
}

/// Readiness health check.
///
/// Returns 503 if the store cannot be reached.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Envelope<()>>) {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(Envelope::notice("ready"))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Envelope::failure("Base de datos no disponible", None)),
            )
        }
    }
}
