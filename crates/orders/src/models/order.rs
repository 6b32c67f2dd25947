//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use registry_core::{OrderId, OrderStatus, UserId, UserSummary};

/// Default page size for `GET /pedidos`.
pub const DEFAULT_LIMIT: i64 = 50;

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned ID.
    pub id: OrderId,
    /// Reference into the user service. Checked only when the order is
    /// created; the user may be deleted later.
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "producto")]
    pub product: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    /// Unit price, always positive.
    #[serde(rename = "precio")]
    pub price: Decimal,
    /// Always at least 1.
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "direccion_envio")]
    pub shipping_address: String,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    /// Set at creation, never changes.
    #[serde(rename = "fecha_pedido")]
    pub created_at: DateTime<Utc>,
    /// Set by every update; `None` until the first one.
    #[serde(rename = "fecha_actualizacion")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// `price * quantity`, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Fields for creating an order. Status and timestamps are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub shipping_address: String,
}

/// A partial update. `description` is nullable, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub product: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
}

impl OrderPatch {
    /// Whether no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.product.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.status.is_none()
            && self.shipping_address.is_none()
    }

    /// Apply the supplied fields and stamp `updated_at`.
    pub fn apply_to(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(product) = &self.product {
            order.product.clone_from(product);
        }
        if let Some(description) = &self.description {
            order.description.clone_from(description);
        }
        if let Some(price) = self.price {
            order.price = price;
        }
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(address) = &self.shipping_address {
            order.shipping_address.clone_from(address);
        }
        order.updated_at = Some(now);
    }
}

/// Optional equality filters for listing orders. Serialized as the
/// `filters` key of the list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderFilter {
    #[serde(rename = "estado")]
    pub status: Option<OrderStatus>,
    #[serde(rename = "usuario_id")]
    pub user_id: Option<UserId>,
}

impl OrderFilter {
    /// Whether `order` passes every supplied filter.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.user_id.is_none_or(|u| u == order.user_id)
    }
}

/// Offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Aggregate figures over every order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    #[serde(rename = "total_pedidos")]
    pub total: i64,
    #[serde(rename = "pendientes")]
    pub pending: i64,
    #[serde(rename = "procesando")]
    pub processing: i64,
    #[serde(rename = "enviados")]
    pub shipped: i64,
    #[serde(rename = "entregados")]
    pub delivered: i64,
    #[serde(rename = "cancelados")]
    pub cancelled: i64,
    /// Sum of `price * quantity`.
    #[serde(rename = "valor_total")]
    pub total_value: Decimal,
    /// Mean of `price * quantity`, rounded to 2 decimal places. Zero when
    /// there are no orders.
    #[serde(rename = "valor_promedio")]
    pub average_value: Decimal,
}

impl OrderStats {
    /// Compute the figures from a full set of orders.
    #[must_use]
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = Self::default();
        for order in orders {
            stats.total += 1;
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Shipped => stats.shipped += 1,
                OrderStatus::Delivered => stats.delivered += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            stats.total_value = stats.total_value.saturating_add(order.line_total());
        }
        if stats.total > 0 {
            stats.average_value = (stats.total_value / Decimal::from(stats.total)).round_dp(2);
        }
        stats
    }
}

/// [`OrderStats`] under the `pedidos_*` count keys served by
/// `/pedidos/estadisticas/resumen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedOrderStats {
    pub total_pedidos: i64,
    pub pedidos_pendientes: i64,
    pub pedidos_procesando: i64,
    pub pedidos_enviados: i64,
    pub pedidos_entregados: i64,
    pub pedidos_cancelados: i64,
    pub valor_total: Decimal,
    pub valor_promedio: Decimal,
}

impl From<OrderStats> for DetailedOrderStats {
    fn from(stats: OrderStats) -> Self {
        Self {
            total_pedidos: stats.total,
            pedidos_pendientes: stats.pending,
            pedidos_procesando: stats.processing,
            pedidos_enviados: stats.shipped,
            pedidos_entregados: stats.delivered,
            pedidos_cancelados: stats.cancelled,
            valor_total: stats.total_value,
            valor_promedio: stats.average_value,
        }
    }
}

/// An order plus the owner's contact details, as returned by read endpoints.
///
/// The user fields are `null` whenever the user service could not supply
/// them: missing user, timeout, or any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "nombre_usuario")]
    pub user_name: Option<String>,
    #[serde(rename = "email_usuario")]
    pub user_email: Option<String>,
    #[serde(rename = "telefono_usuario")]
    pub user_phone: Option<String>,
}

impl EnrichedOrder {
    /// Attach `user` to `order`; `None` leaves the user fields empty.
    #[must_use]
    pub fn new(order: Order, user: Option<UserSummary>) -> Self {
        match user {
            Some(user) => Self {
                order,
                user_name: Some(user.name),
                user_email: Some(user.email),
                user_phone: user.phone,
            },
            None => Self {
                order,
                user_name: None,
                user_email: None,
                user_phone: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn order(id: i32, status: OrderStatus, price: &str, quantity: i32) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            product: "Libro".to_owned(),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            quantity,
            shipping_address: "Calle 1".to_owned(),
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_stats_of_nothing_are_zero() {
        let stats = OrderStats::from_orders(&[]);
        assert_eq!(stats, OrderStats::default());
        assert_eq!(stats.average_value, Decimal::ZERO);
    }

    #[test]
    fn test_stats_counts_and_rounds_average() {
        let orders = [
            order(1, OrderStatus::Pending, "10.00", 1),
            order(2, OrderStatus::Shipped, "5.00", 2),
            order(3, OrderStatus::Shipped, "3.33", 1),
        ];
        let stats = OrderStats::from_orders(&orders);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.shipped, 2);
        assert_eq!(stats.total_value, Decimal::from_str("23.33").unwrap());
        assert_eq!(stats.average_value, Decimal::from_str("7.78").unwrap());
    }

    #[test]
    fn test_stats_saturate_instead_of_overflowing() {
        let mut huge = order(1, OrderStatus::Pending, "1", 2);
        huge.price = Decimal::MAX;
        assert_eq!(huge.line_total(), Decimal::MAX);

        let stats = OrderStats::from_orders(&[huge.clone(), huge]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_value, Decimal::MAX);
    }

    #[test]
    fn test_detailed_stats_use_prefixed_keys() {
        let orders = [
            order(1, OrderStatus::Pending, "10.00", 1),
            order(2, OrderStatus::Cancelled, "5.00", 1),
        ];
        let value =
            serde_json::to_value(DetailedOrderStats::from(OrderStats::from_orders(&orders)))
                .unwrap();

        assert_eq!(value["total_pedidos"], 2);
        assert_eq!(value["pedidos_pendientes"], 1);
        assert_eq!(value["pedidos_cancelados"], 1);
        assert_eq!(value["valor_total"], "15.00");
        assert!(value.get("pendientes").is_none());
    }

    #[test]
    fn test_patch_stamps_updated_at_even_when_value_unchanged() {
        let mut o = order(1, OrderStatus::Pending, "10.00", 1);
        let now = Utc::now();
        let patch = OrderPatch {
            status: Some(OrderStatus::Pending),
            ..OrderPatch::default()
        };
        patch.apply_to(&mut o, now);
        assert_eq!(o.updated_at, Some(now));
    }

    #[test]
    fn test_filter_matches() {
        let o = order(1, OrderStatus::Shipped, "1.00", 1);
        assert!(OrderFilter::default().matches(&o));
        assert!(
            OrderFilter {
                status: Some(OrderStatus::Shipped),
                user_id: Some(UserId::new(1)),
            }
            .matches(&o)
        );
        assert!(
            !OrderFilter {
                status: Some(OrderStatus::Pending),
                user_id: None,
            }
            .matches(&o)
        );
    }

    #[test]
    fn test_enriched_order_flattens_with_null_user_fields() {
        let mut o = order(7, OrderStatus::Pending, "10.50", 2);
        o.description = Some("Tapa dura".to_owned());
        let value = serde_json::to_value(EnrichedOrder::new(o, None)).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["precio"], "10.50");
        assert_eq!(value["estado"], "pendiente");
        assert_eq!(value["descripcion"], "Tapa dura");
        assert_eq!(value["nombre_usuario"], json!(null));
        assert_eq!(value["fecha_actualizacion"], json!(null));
    }

    #[test]
    fn test_enriched_order_copies_user_fields() {
        let user = UserSummary {
            id: UserId::new(1),
            name: "Ana".to_owned(),
            email: "ana@x.com".to_owned(),
            phone: None,
        };
        let enriched = EnrichedOrder::new(order(1, OrderStatus::Pending, "1", 1), Some(user));
        assert_eq!(enriched.user_name.as_deref(), Some("Ana"));
        assert_eq!(enriched.user_email.as_deref(), Some("ana@x.com"));
        assert_eq!(enriched.user_phone, None);
    }
}
