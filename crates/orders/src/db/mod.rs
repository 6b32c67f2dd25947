//! Data access for the order registry.
//!
//! # Table: `pedidos`
//!
//! Owned exclusively by this service. `usuario_id` is a plain integer with no
//! foreign key; users live in another service's table.
//!
//! # Stores
//!
//! - [`PgOrderStore`] - `PostgreSQL` implementation used in production
//! - [`MemoryOrderStore`] - in-process implementation for tests and local demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/orders/migrations/` and run via:
//! ```bash
//! cargo run -p registry-cli -- migrate orders
//! ```

pub mod memory;
pub mod orders;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use registry_core::{OrderId, UserId};
pub use registry_core::db::{RepositoryError, check_connection, create_pool};

use crate::models::{NewOrder, Order, OrderFilter, OrderPatch, OrderStats, Page};

pub use memory::MemoryOrderStore;
pub use orders::PgOrderStore;

/// Shortest accepted search term, in characters.
pub const MIN_SEARCH_TERM_CHARS: usize = 2;

/// Width of `pedidos.producto`.
pub const PRODUCT_MAX_CHARS: usize = 200;

/// Decimal places kept by `pedidos.precio`.
pub const PRICE_SCALE: u32 = 2;

/// Largest value `pedidos.precio` (`NUMERIC(12, 2)`) can hold.
/// Mantissa 999_999_999_999 split into 32-bit words (`lo`, `mid`).
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, PRICE_SCALE);

/// Persistence port for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Orders passing `filter`, ordered by id ascending, one page at a time.
    async fn list(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, RepositoryError>;

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError>;

    /// Every order of one user, ordered by id ascending.
    ///
    /// Does not check that the user exists.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Insert an order as `pendiente`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a required text is blank or too long, the price is
    /// not positive or does not fit `NUMERIC(12, 2)`, or the quantity is
    /// below 1.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Apply a partial update and refresh `fecha_actualizacion`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty patch or invalid values, `NotFound` if
    /// the order is absent.
    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, RepositoryError>;

    /// Delete an order and return the deleted snapshot.
    async fn delete(&self, id: OrderId) -> Result<Order, RepositoryError>;

    /// Orders whose product or description contains `term`
    /// (case-insensitive), ordered by id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `term` is shorter than [`MIN_SEARCH_TERM_CHARS`].
    async fn search(&self, term: &str) -> Result<Vec<Order>, RepositoryError>;

    /// Counts per status and order values over the whole table.
    async fn summary_stats(&self) -> Result<OrderStats, RepositoryError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

fn invalid(message: &str) -> RepositoryError {
    RepositoryError::InvalidInput(message.to_owned())
}

fn check_price(price: Decimal) -> Result<(), RepositoryError> {
    if price <= Decimal::ZERO {
        return Err(invalid("El precio debe ser mayor que 0"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(invalid("El precio admite como máximo 2 decimales"));
    }
    if price > MAX_PRICE {
        return Err(invalid("El precio excede el máximo permitido"));
    }
    Ok(())
}

fn check_product(product: &str) -> Result<(), RepositoryError> {
    if product.trim().chars().count() > PRODUCT_MAX_CHARS {
        return Err(RepositoryError::InvalidInput(format!(
            "El producto no puede superar {PRODUCT_MAX_CHARS} caracteres"
        )));
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), RepositoryError> {
    if quantity < 1 {
        return Err(invalid("La cantidad debe ser al menos 1"));
    }
    Ok(())
}

/// Reject an order with blank required text, text or a price that does not
/// fit its column, or a quantity below 1.
pub(crate) fn check_new_order(order: &NewOrder) -> Result<(), RepositoryError> {
    if order.product.trim().is_empty() || order.shipping_address.trim().is_empty() {
        return Err(invalid(
            "Usuario ID, producto, precio y dirección de envío son requeridos",
        ));
    }
    check_product(&order.product)?;
    check_price(order.price)?;
    check_quantity(order.quantity)
}

/// Reject an empty patch or one carrying invalid values.
pub(crate) fn check_patch(patch: &OrderPatch) -> Result<(), RepositoryError> {
    if patch.is_empty() {
        return Err(invalid("No se proporcionaron campos para actualizar"));
    }
    if let Some(product) = &patch.product {
        if product.trim().is_empty() {
            return Err(invalid("El producto no puede estar vacío"));
        }
        check_product(product)?;
    }
    if patch
        .shipping_address
        .as_deref()
        .is_some_and(|a| a.trim().is_empty())
    {
        return Err(invalid("La dirección de envío no puede estar vacía"));
    }
    if let Some(price) = patch.price {
        check_price(price)?;
    }
    if let Some(quantity) = patch.quantity {
        check_quantity(quantity)?;
    }
    Ok(())
}

/// Reject search terms shorter than [`MIN_SEARCH_TERM_CHARS`].
pub(crate) fn check_search_term(term: &str) -> Result<(), RepositoryError> {
    if term.trim().chars().count() < MIN_SEARCH_TERM_CHARS {
        return Err(invalid(
            "El término de búsqueda debe tener al menos 2 caracteres",
        ));
    }
    Ok(())
}

/// Apply the embedded `pedidos` migrations.
///
/// Both services may share one database, so migrations recorded by the other
/// service are ignored rather than treated as missing.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await
}
