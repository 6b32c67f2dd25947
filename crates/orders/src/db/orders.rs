//! `PostgreSQL` order store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use registry_core::db::{classify_write_error, like_pattern};
use registry_core::{OrderId, OrderStatus, UserId};

use super::{OrderStore, RepositoryError, check_new_order, check_patch, check_search_term};
use crate::models::{NewOrder, Order, OrderFilter, OrderPatch, OrderStats, Page};

const ORDER_COLUMNS: &str = "id, usuario_id, producto, descripcion, precio, cantidad, \
                             direccion_envio, estado, fecha_pedido, fecha_actualizacion";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i32,
    usuario_id: i32,
    producto: String,
    descripcion: Option<String>,
    precio: Decimal,
    cantidad: i32,
    direccion_envio: String,
    estado: OrderStatus,
    fecha_pedido: DateTime<Utc>,
    fecha_actualizacion: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.usuario_id),
            product: row.producto,
            description: row.descripcion,
            price: row.precio,
            quantity: row.cantidad,
            shipping_address: row.direccion_envio,
            status: row.estado,
            created_at: row.fecha_pedido,
            updated_at: row.fecha_actualizacion,
        }
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Vec<Order> {
    rows.into_iter().map(Order::from).collect()
}

#[derive(Debug, FromRow)]
struct StatsRow {
    total_pedidos: i64,
    pendientes: i64,
    procesando: i64,
    enviados: i64,
    entregados: i64,
    cancelados: i64,
    valor_total: Decimal,
    valor_promedio: Decimal,
}

/// Order store backed by the `pedidos` table.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(ORDER_COLUMNS);
        builder.push(" FROM pedidos WHERE TRUE");
        if let Some(status) = filter.status {
            builder.push(" AND estado = ");
            builder.push_bind(status);
        }
        if let Some(user_id) = filter.user_id {
            builder.push(" AND usuario_id = ");
            builder.push_bind(user_id);
        }
        builder.push(" ORDER BY id LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);

        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(into_orders(rows))
    }

    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM pedidos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM pedidos WHERE usuario_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_orders(rows))
    }

    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        check_new_order(&order)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO pedidos
                 (usuario_id, producto, descripcion, precio, cantidad, direccion_envio)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(order.product.trim())
        .bind(order.description)
        .bind(order.price)
        .bind(order.quantity)
        .bind(order.shipping_address.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(row.into())
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, RepositoryError> {
        check_patch(&patch)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE pedidos SET ");
        let mut set = builder.separated(", ");
        if let Some(product) = patch.product {
            set.push("producto = ");
            set.push_bind_unseparated(product.trim().to_owned());
        }
        if let Some(description) = patch.description {
            set.push("descripcion = ");
            set.push_bind_unseparated(description);
        }
        if let Some(price) = patch.price {
            set.push("precio = ");
            set.push_bind_unseparated(price);
        }
        if let Some(quantity) = patch.quantity {
            set.push("cantidad = ");
            set.push_bind_unseparated(quantity);
        }
        if let Some(status) = patch.status {
            set.push("estado = ");
            set.push_bind_unseparated(status);
        }
        if let Some(address) = patch.shipping_address {
            set.push("direccion_envio = ");
            set.push_bind_unseparated(address.trim().to_owned());
        }
        set.push("fecha_actualizacion = now()");
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(ORDER_COLUMNS);

        let row = builder
            .build_query_as::<OrderRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_write_error)?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "DELETE FROM pedidos WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    async fn search(&self, term: &str) -> Result<Vec<Order>, RepositoryError> {
        check_search_term(term)?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"SELECT {ORDER_COLUMNS} FROM pedidos
              WHERE producto ILIKE $1 ESCAPE '\' OR descripcion ILIKE $1 ESCAPE '\'
              ORDER BY id"
        ))
        .bind(like_pattern(term.trim()))
        .fetch_all(&self.pool)
        .await?;

        Ok(into_orders(rows))
    }

    async fn summary_stats(&self) -> Result<OrderStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"SELECT
                  COUNT(*) AS total_pedidos,
                  COUNT(*) FILTER (WHERE estado = 'pendiente') AS pendientes,
                  COUNT(*) FILTER (WHERE estado = 'procesando') AS procesando,
                  COUNT(*) FILTER (WHERE estado = 'enviado') AS enviados,
                  COUNT(*) FILTER (WHERE estado = 'entregado') AS entregados,
                  COUNT(*) FILTER (WHERE estado = 'cancelado') AS cancelados,
                  COALESCE(SUM(precio * cantidad), 0) AS valor_total,
                  COALESCE(ROUND(AVG(precio * cantidad), 2), 0) AS valor_promedio
              FROM pedidos",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderStats {
            total: row.total_pedidos,
            pending: row.pendientes,
            processing: row.procesando,
            shipped: row.enviados,
            delivered: row.entregados,
            cancelled: row.cancelados,
            total_value: row.valor_total,
            average_value: row.valor_promedio,
        })
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        super::check_connection(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at DATABASE_URL"]
    async fn test_update_refreshes_timestamp() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        super::super::run_migrations(&pool).await.unwrap();
        let store = PgOrderStore::new(pool);

        let created = store
            .create(NewOrder {
                user_id: UserId::new(1),
                product: "Libro".to_owned(),
                description: None,
                price: Decimal::new(1050, 2),
                quantity: 1,
                shipping_address: "Calle 1".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, OrderStatus::Pending);
        assert!(created.updated_at.is_none());

        let updated = store
            .update(
                created.id,
                OrderPatch {
                    status: Some(OrderStatus::Shipped),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, created.created_at);

        store.delete(created.id).await.unwrap();
    }
}
