//! HTTP routes for the order service.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness + configured user service
//! GET    /health/ready                 - Database readiness
//!
//! GET    /pedidos                      - List (filters, paging), enriched
//! POST   /pedidos                      - Create after user validation
//! GET    /pedidos/buscar/{termino}     - Search product/description, enriched
//! GET    /pedidos/stats/resumen        - Summary statistics
//! GET    /pedidos/estadisticas/resumen - Same figures, `pedidos_*` keys
//! GET    /pedidos/{id}                 - Get order, enriched
//! PUT    /pedidos/{id}                 - Partial update
//! DELETE /pedidos/{id}                 - Delete order
//!
//! GET    /usuarios/{user_id}/pedidos   - Orders of a validated user, enriched
//! ```

pub mod health;
pub mod orders;

use std::any::Any;
use std::str::FromStr;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use registry_core::Envelope;

use crate::error::{AppError, INTERNAL_ERROR};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the `/pedidos` routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/buscar/{termino}", get(orders::search))
        .route("/stats/resumen", get(orders::stats))
        .route("/estadisticas/resumen", get(orders::detailed_stats))
        .route(
            "/{id}",
            get(orders::show).put(orders::update).delete(orders::destroy),
        )
}

/// Build the complete application with middleware, minus the Sentry layers
/// that `main` adds on top.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/pedidos", order_routes())
        .route("/usuarios/{user_id}/pedidos", get(orders::by_user))
        .fallback(fallback)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn fallback() -> AppError {
    AppError::NotFound("Ruta no encontrada".to_string())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    tracing::error!(panic = %details, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure(INTERNAL_ERROR, Some(details))),
    )
        .into_response()
}

/// Parse a numeric path id; anything else is reported as `not_found`.
pub(crate) fn parse_id<T: FromStr>(raw: &str, not_found: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}
