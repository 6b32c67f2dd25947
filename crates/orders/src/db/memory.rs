//! In-process order store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use registry_core::{OrderId, OrderStatus, UserId};

use super::{OrderStore, RepositoryError, check_new_order, check_patch, check_search_term};
use crate::models::{NewOrder, Order, OrderFilter, OrderPatch, OrderStats, Page};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    orders: BTreeMap<OrderId, Order>,
}

/// Order store held in memory behind an async lock.
///
/// Iteration over the `BTreeMap` yields orders by id ascending, matching the
/// `ORDER BY id` of the `PostgreSQL` store.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    inner: RwLock<Inner>,
}

impl MemoryOrderStore {
    /// Create an empty store. The first order gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store holds no orders.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.orders.is_empty()
    }
}

fn page_bound(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list(&self, filter: OrderFilter, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .skip(page_bound(page.offset))
            .take(page_bound(page.limit))
            .cloned()
            .collect())
    }

    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.inner
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        check_new_order(&order)?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let created = Order {
            id: OrderId::new(inner.next_id),
            user_id: order.user_id,
            product: order.product.trim().to_owned(),
            description: order.description,
            price: order.price,
            quantity: order.quantity,
            shipping_address: order.shipping_address.trim().to_owned(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.orders.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order, RepositoryError> {
        check_patch(&patch)?;

        let mut inner = self.inner.write().await;
        let order = inner.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        patch.apply_to(order, Utc::now());
        order.product = order.product.trim().to_owned();
        order.shipping_address = order.shipping_address.trim().to_owned();
        Ok(order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.inner
            .write()
            .await
            .orders
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn search(&self, term: &str) -> Result<Vec<Order>, RepositoryError> {
        check_search_term(term)?;

        let needle = term.trim().to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| {
                o.product.to_lowercase().contains(&needle)
                    || o
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn summary_stats(&self) -> Result<OrderStats, RepositoryError> {
        Ok(OrderStats::from_orders(
            self.inner.read().await.orders.values(),
        ))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn new_order(user: i32, product: &str, description: Option<&str>) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            product: product.to_owned(),
            description: description.map(str::to_owned),
            price: Decimal::new(1000, 2),
            quantity: 1,
            shipping_address: "Calle 1".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_pending_and_timestamps() {
        let store = MemoryOrderStore::new();
        let order = store.create(new_order(1, "Libro", None)).await.unwrap();

        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp_and_keeps_created_at() {
        let store = MemoryOrderStore::new();
        let order = store.create(new_order(1, "Libro", None)).await.unwrap();

        let updated = store
            .update(
                order.id,
                OrderPatch {
                    status: Some(OrderStatus::Shipped),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.created_at, order.created_at);
        assert!(updated.updated_at.unwrap() >= order.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_and_empty() {
        let store = MemoryOrderStore::new();
        assert!(matches!(
            store
                .update(
                    OrderId::new(9),
                    OrderPatch {
                        quantity: Some(2),
                        ..OrderPatch::default()
                    }
                )
                .await,
            Err(RepositoryError::NotFound)
        ));

        let order = store.create(new_order(1, "Libro", None)).await.unwrap();
        assert!(matches!(
            store.update(order.id, OrderPatch::default()).await,
            Err(RepositoryError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let store = MemoryOrderStore::new();
        for user in [1, 2, 1, 1] {
            store.create(new_order(user, "Libro", None)).await.unwrap();
        }

        let by_user = store
            .list(
                OrderFilter {
                    status: None,
                    user_id: Some(UserId::new(1)),
                },
                Page::default(),
            )
            .await
            .unwrap();
        let ids: Vec<i32> = by_user.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, [1, 3, 4]);

        let page = store
            .list(OrderFilter::default(), Page { limit: 2, offset: 1 })
            .await
            .unwrap();
        let ids: Vec<i32> = page.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, [2, 3]);
    }

    #[tokio::test]
    async fn test_search_product_or_description() {
        let store = MemoryOrderStore::new();
        store.create(new_order(1, "Bolígrafo", None)).await.unwrap();
        store
            .create(new_order(1, "Cuaderno", Some("Tapa de BOLSA")))
            .await
            .unwrap();
        store.create(new_order(1, "Lápiz", None)).await.unwrap();

        let found = store.search("bo").await.unwrap();
        let ids: Vec<i32> = found.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, [1, 2]);

        assert!(matches!(
            store.search("b").await,
            Err(RepositoryError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_on_empty_store() {
        let stats = MemoryOrderStore::new().summary_stats().await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.total_value, Decimal::ZERO);
        assert_eq!(stats.average_value, Decimal::ZERO);
    }
}
