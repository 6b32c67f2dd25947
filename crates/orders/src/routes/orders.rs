//! `/pedidos` handlers and the per-user order listing.
//!
//! Reads are enriched with user details and never fail because the user
//! service does. Creation and the per-user listing go through the validation
//! gate first and are refused if the user cannot be confirmed.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use registry_core::{Envelope, OrderId, OrderStatus, UserId};

use super::parse_id;
use crate::error::{AppError, ORDER_NOT_FOUND, Result};
use crate::models::{
    DetailedOrderStats, EnrichedOrder, NewOrder, Order, OrderFilter, OrderPatch, OrderStats, Page,
};
use crate::state::AppState;

const REQUIRED_FIELDS: &str = "Usuario ID, producto, precio y dirección de envío son requeridos";

/// Query string of `GET /pedidos`. Values are parsed by hand so that a bad
/// value produces an enveloped 400; empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub estado: Option<String>,
    pub usuario_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, value: Option<&str>, default: i64) -> Result<i64> {
    match present(value) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| AppError::BadRequest(format!("Valor inválido para {name}: {raw}"))),
    }
}

impl ListParams {
    fn into_query(self) -> Result<(OrderFilter, Page)> {
        let status = present(self.estado.as_deref())
            .map(|raw| {
                raw.parse::<OrderStatus>()
                    .map_err(|_| AppError::BadRequest(format!("Estado inválido: {raw}")))
            })
            .transpose()?;
        let user_id = present(self.usuario_id.as_deref())
            .map(|raw| {
                raw.parse::<UserId>()
                    .map_err(|_| AppError::BadRequest(format!("usuario_id inválido: {raw}")))
            })
            .transpose()?;
        let defaults = Page::default();
        let page = Page {
            limit: parse_bound("limit", self.limit.as_deref(), defaults.limit)?,
            offset: parse_bound("offset", self.offset.as_deref(), defaults.offset)?,
        };

        Ok((OrderFilter { status, user_id }, page))
    }
}

/// Body of `POST /pedidos`. `precio` accepts a JSON number or string.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub usuario_id: Option<UserId>,
    #[serde(default)]
    pub producto: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub precio: Option<Decimal>,
    #[serde(default)]
    pub cantidad: Option<i32>,
    #[serde(default)]
    pub direccion_envio: Option<String>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder> {
        let product = self.producto.filter(|p| !p.trim().is_empty());
        let address = self.direccion_envio.filter(|a| !a.trim().is_empty());
        let (Some(user_id), Some(product), Some(price), Some(shipping_address)) =
            (self.usuario_id, product, self.precio, address)
        else {
            return Err(AppError::BadRequest(REQUIRED_FIELDS.to_string()));
        };

        Ok(NewOrder {
            user_id,
            product,
            description: self.descripcion,
            price,
            quantity: self.cantidad.unwrap_or(1),
            shipping_address,
        })
    }
}

/// Body of `PUT /pedidos/{id}`. `descripcion` accepts `null` to clear.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub producto: Option<String>,
    #[serde(default, deserialize_with = "registry_core::patch::present")]
    pub descripcion: Option<Option<String>>,
    #[serde(default)]
    pub precio: Option<Decimal>,
    #[serde(default)]
    pub cantidad: Option<i32>,
    #[serde(default)]
    pub estado: Option<OrderStatus>,
    #[serde(default)]
    pub direccion_envio: Option<String>,
}

impl From<UpdateOrderRequest> for OrderPatch {
    fn from(body: UpdateOrderRequest) -> Self {
        Self {
            product: body.producto,
            description: body.descripcion,
            price: body.precio,
            quantity: body.cantidad,
            status: body.estado,
            shipping_address: body.direccion_envio,
        }
    }
}

/// `GET /pedidos?estado=&usuario_id=&limit=&offset=`
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<EnrichedOrder>>>> {
    let (filter, page) = params.into_query()?;
    let orders = state.store().list(filter, page).await?;
    let enriched = state.enricher().enrich(orders).await;

    Ok(Json(Envelope::list(enriched).with_meta(
        "filters",
        json!({"estado": filter.status, "usuario_id": filter.user_id}),
    )))
}

/// `GET /pedidos/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<EnrichedOrder>>> {
    let id: OrderId = parse_id(&id, ORDER_NOT_FOUND)?;
    let order = state.store().get(id).await?;
    Ok(Json(Envelope::ok(state.enricher().enrich_one(order).await)))
}

/// `GET /usuarios/{user_id}/pedidos`
///
/// 404 when the user service cannot confirm the user, so an unknown user is
/// distinguishable from one with no orders.
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<Vec<EnrichedOrder>>>> {
    let not_found = || AppError::NotFound(format!("Usuario con ID {user_id} no encontrado"));

    let id: UserId = user_id.parse().map_err(|_| not_found())?;
    state.gate().admit(id).await.map_err(|_| not_found())?;

    let orders = state.store().list_by_user(id).await?;
    let enriched = state.enricher().enrich(orders).await;

    Ok(Json(
        Envelope::list(enriched).with_meta("usuario_id", id.as_i32()),
    ))
}

/// `POST /pedidos`
///
/// The user is checked exactly once before anything is written; a rejected
/// user leaves the store untouched.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<EnrichedOrder>>)> {
    let Json(body) = payload?;
    let new_order = body.into_new_order()?;
    crate::db::check_new_order(&new_order)?;

    let user_id = new_order.user_id;
    state.gate().admit(user_id).await.map_err(|rejection| {
        AppError::BadRequest(format!(
            "Usuario con ID {} no encontrado en el sistema",
            rejection.user_id
        ))
    })?;

    let order = state.store().create(new_order).await?;
    tracing::info!(order_id = %order.id, user_id = %user_id, "Order created");

    let enriched = state.enricher().enrich_one(order).await;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(enriched).with_message("Pedido creado exitosamente")),
    ))
}

/// `PUT /pedidos/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<Envelope<Order>>> {
    let id: OrderId = parse_id(&id, ORDER_NOT_FOUND)?;
    let Json(body) = payload?;
    let order = state.store().update(id, body.into()).await?;

    Ok(Json(
        Envelope::ok(order).with_message("Pedido actualizado exitosamente"),
    ))
}

/// `DELETE /pedidos/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Order>>> {
    let id: OrderId = parse_id(&id, ORDER_NOT_FOUND)?;
    let order = state.store().delete(id).await?;

    tracing::info!(order_id = %order.id, "Order deleted");

    Ok(Json(
        Envelope::ok(order).with_message("Pedido eliminado exitosamente"),
    ))
}

/// `GET /pedidos/buscar/{termino}`
pub async fn search(
    State(state): State<AppState>,
    Path(termino): Path<String>,
) -> Result<Json<Envelope<Vec<EnrichedOrder>>>> {
    let orders = state.store().search(&termino).await?;
    let enriched = state.enricher().enrich(orders).await;

    Ok(Json(
        Envelope::list(enriched).with_meta("termino_busqueda", termino),
    ))
}

/// `GET /pedidos/stats/resumen`
pub async fn stats(State(state): State<AppState>) -> Result<Json<Envelope<OrderStats>>> {
    let stats = state.store().summary_stats().await?;
    Ok(Json(Envelope::ok(stats)))
}

/// `GET /pedidos/estadisticas/resumen`: the same figures under `pedidos_*`
/// count keys.
pub async fn detailed_stats(
    State(state): State<AppState>,
) -> Result<Json<Envelope<DetailedOrderStats>>> {
    let stats = state.store().summary_stats().await?;
    Ok(Json(Envelope::ok(stats.into())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::db::{MemoryOrderStore, OrderStore};
    use crate::routes::app;
    use crate::services::testing::ScriptedLookup;

    struct Harness {
        app: Router,
        store: Arc<MemoryOrderStore>,
        lookup: Arc<ScriptedLookup>,
    }

    fn harness(lookup: ScriptedLookup) -> Harness {
        let store = Arc::new(MemoryOrderStore::new());
        let lookup = Arc::new(lookup);
        let app = app(AppState::new(
            store.clone(),
            lookup.clone(),
            "http://localhost:5001",
        ));
        Harness { app, store, lookup }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn libro(user: i32) -> Value {
        json!({
            "usuario_id": user,
            "producto": "Libro",
            "precio": 10.5,
            "direccion_envio": "Calle 1"
        })
    }

    #[tokio::test]
    async fn test_create_validates_once_then_enriches() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));
        let (status, body) = send(&h.app, "POST", "/pedidos", Some(libro(1))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Pedido creado exitosamente");
        assert_eq!(body["data"]["estado"], "pendiente");
        assert_eq!(body["data"]["cantidad"], 1);
        assert_eq!(body["data"]["precio"], "10.5");
        assert_eq!(body["data"]["nombre_usuario"], "Ana");
        // one for the gate, one for enrichment
        assert_eq!(h.lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_create_for_unknown_user_writes_nothing() {
        let h = harness(ScriptedLookup::new());
        let (status, body) = send(&h.app, "POST", "/pedidos", Some(libro(999))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Usuario con ID 999 no encontrado en el sistema"
        );
        assert_eq!(h.lookup.calls(), 1);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_or_invalid_fields_without_lookup() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));

        let (status, body) = send(
            &h.app,
            "POST",
            "/pedidos",
            Some(json!({"usuario_id": 1, "producto": "Libro"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], REQUIRED_FIELDS);

        let mut zero_price = libro(1);
        zero_price["precio"] = json!(0);
        let (status, _) = send(&h.app, "POST", "/pedidos", Some(zero_price)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut zero_quantity = libro(1);
        zero_quantity["cantidad"] = json!(0);
        let (status, _) = send(&h.app, "POST", "/pedidos", Some(zero_quantity)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(h.lookup.calls(), 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_rejects_values_the_columns_cannot_hold() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));

        let mut fraction_of_cent = libro(1);
        fraction_of_cent["precio"] = json!("0.001");
        let (status, body) = send(&h.app, "POST", "/pedidos", Some(fraction_of_cent)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let mut too_expensive = libro(1);
        too_expensive["precio"] = json!("100000000000");
        let (status, _) = send(&h.app, "POST", "/pedidos", Some(too_expensive)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut long_name = libro(1);
        long_name["producto"] = json!("a".repeat(201));
        let (status, _) = send(&h.app, "POST", "/pedidos", Some(long_name)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(h.lookup.calls(), 0);
        assert!(h.store.is_empty().await);

        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;
        let (status, _) = send(&h.app, "PUT", "/pedidos/1", Some(json!({"precio": "19.999"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, body) = send(&h.app, "GET", "/pedidos/1", None).await;
        assert_eq!(body["data"]["precio"], "10.5");
    }

    #[tokio::test]
    async fn test_reads_fail_open_for_vanished_user() {
        let h = harness(ScriptedLookup::new());
        h.store
            .create(NewOrder {
                user_id: UserId::new(5),
                product: "Libro".to_owned(),
                description: None,
                price: Decimal::new(1000, 2),
                quantity: 1,
                shipping_address: "Calle 1".to_owned(),
            })
            .await
            .unwrap();

        let (status, body) = send(&h.app, "GET", "/pedidos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["nombre_usuario"], Value::Null);
        assert_eq!(body["data"][0]["email_usuario"], Value::Null);

        let (status, body) = send(&h.app, "GET", "/pedidos/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["telefono_usuario"], Value::Null);
    }

    #[tokio::test]
    async fn test_list_by_user_gate_is_404_for_unknown_user() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));

        let (status, body) = send(&h.app, "GET", "/usuarios/999/pedidos", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Usuario con ID 999 no encontrado");

        let (status, body) = send(&h.app, "GET", "/usuarios/1/pedidos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert_eq!(body["usuario_id"], 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_bad_query_values() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana").with_user(2, "Bob"));
        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;
        send(&h.app, "POST", "/pedidos", Some(libro(2))).await;
        send(
            &h.app,
            "PUT",
            "/pedidos/2",
            Some(json!({"estado": "enviado"})),
        )
        .await;

        let (status, body) = send(&h.app, "GET", "/pedidos?estado=enviado", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["nombre_usuario"], "Bob");
        assert_eq!(body["filters"]["estado"], "enviado");
        assert_eq!(body["filters"]["usuario_id"], Value::Null);

        let (_, body) = send(&h.app, "GET", "/pedidos?usuario_id=1&limit=10", None).await;
        assert_eq!(body["total"], 1);

        for query in ["estado=perdido", "usuario_id=abc", "limit=-1", "offset=x"] {
            let (status, body) = send(&h.app, "GET", &format!("/pedidos?{query}"), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp_and_rejects_empty() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));
        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;

        let (status, body) = send(
            &h.app,
            "PUT",
            "/pedidos/1",
            Some(json!({"estado": "procesando", "descripcion": "Urgente"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["estado"], "procesando");
        assert_eq!(body["data"]["descripcion"], "Urgente");
        assert!(body["data"]["fecha_actualizacion"].is_string());

        let (status, body) = send(&h.app, "PUT", "/pedidos/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No se proporcionaron campos para actualizar");

        let (status, _) = send(&h.app, "PUT", "/pedidos/1", Some(json!({"estado": "perdido"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&h.app, "PUT", "/pedidos/42", Some(json!({"cantidad": 2}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_404() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));
        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;

        let (status, body) = send(&h.app, "DELETE", "/pedidos/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["producto"], "Libro");

        let (status, body) = send(&h.app, "GET", "/pedidos/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], ORDER_NOT_FOUND);

        let (status, _) = send(&h.app, "GET", "/pedidos/uno", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_requires_two_characters() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));
        let mut boli = libro(1);
        boli["producto"] = json!("Bolígrafo");
        send(&h.app, "POST", "/pedidos", Some(boli)).await;
        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;

        let (status, body) = send(&h.app, "GET", "/pedidos/buscar/bo", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["termino_busqueda"], "bo");
        assert_eq!(body["data"][0]["nombre_usuario"], "Ana");

        let (status, body) = send(&h.app, "GET", "/pedidos/buscar/b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "El término de búsqueda debe tener al menos 2 caracteres"
        );
    }

    #[tokio::test]
    async fn test_stats_on_both_paths() {
        let h = harness(ScriptedLookup::new().with_user(1, "Ana"));

        let (status, body) = send(&h.app, "GET", "/pedidos/stats/resumen", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_pedidos"], 0);
        assert_eq!(body["data"]["valor_total"], "0");
        assert_eq!(body["data"]["valor_promedio"], "0");

        let mut two = libro(1);
        two["cantidad"] = json!(2);
        send(&h.app, "POST", "/pedidos", Some(two)).await;
        send(&h.app, "POST", "/pedidos", Some(libro(1))).await;

        let (status, body) = send(&h.app, "GET", "/pedidos/estadisticas/resumen", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_pedidos"], 2);
        assert_eq!(body["data"]["pedidos_pendientes"], 2);
        assert_eq!(body["data"]["pedidos_enviados"], 0);
        assert_eq!(body["data"]["valor_total"], "31.5");
        assert_eq!(body["data"]["valor_promedio"], "15.75");
        assert!(body["data"].get("pendientes").is_none());

        let (_, body) = send(&h.app, "GET", "/pedidos/stats/resumen", None).await;
        assert_eq!(body["data"]["pendientes"], 2);
        assert!(body["data"].get("pedidos_pendientes").is_none());
    }

    #[tokio::test]
    async fn test_health_reports_user_service() {
        let h = harness(ScriptedLookup::new());
        let (status, body) = send(&h.app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_service"], "http://localhost:5001");
        assert_eq!(
            body["message"],
            "Servicio de pedidos funcionando correctamente"
        );
    }
}
