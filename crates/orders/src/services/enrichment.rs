//! Attaches user details to orders.
//!
//! One lookup task is spawned per distinct user id and all of them are joined
//! before the response is built. Results are merged back in the order the
//! orders arrived, whatever order the lookups finish in. Lookup failures only
//! blank the user fields; they never fail the read.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::{JoinError, JoinHandle};

use registry_core::{UserId, UserSummary};

use super::UserLookup;
use crate::models::{EnrichedOrder, Order};

/// Fans out user lookups for a batch of orders.
#[derive(Clone)]
pub struct Enricher {
    lookup: Arc<dyn UserLookup>,
}

impl Enricher {
    /// Create an enricher over a lookup client.
    #[must_use]
    pub fn new(lookup: Arc<dyn UserLookup>) -> Self {
        Self { lookup }
    }

    /// Enrich every order, preserving input order.
    ///
    /// Lookup tasks are not tied to the caller: if the request future is
    /// dropped they still run to completion and their results are discarded.
    pub async fn enrich(&self, orders: Vec<Order>) -> Vec<EnrichedOrder> {
        let mut user_ids: Vec<UserId> = orders.iter().map(|o| o.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let handles: Vec<_> = user_ids.iter().map(|&id| self.spawn_lookup(id)).collect();
        let results = join_all(handles).await;

        let users: HashMap<UserId, UserSummary> = user_ids
            .into_iter()
            .zip(results)
            .filter_map(|(id, result)| settle(id, result).map(|user| (id, user)))
            .collect();

        orders
            .into_iter()
            .map(|order| {
                let user = users.get(&order.user_id).cloned();
                EnrichedOrder::new(order, user)
            })
            .collect()
    }

    /// Enrich a single order.
    pub async fn enrich_one(&self, order: Order) -> EnrichedOrder {
        let user_id = order.user_id;
        let user = settle(user_id, self.spawn_lookup(user_id).await);
        EnrichedOrder::new(order, user)
    }

    fn spawn_lookup(&self, user_id: UserId) -> JoinHandle<Option<UserSummary>> {
        let lookup = Arc::clone(&self.lookup);
        tokio::spawn(async move { lookup.lookup(user_id).await })
    }
}

/// A lookup task that panicked or was cancelled counts as no user.
fn settle(
    user_id: UserId,
    result: Result<Option<UserSummary>, JoinError>,
) -> Option<UserSummary> {
    result.unwrap_or_else(|e| {
        tracing::warn!(user_id = %user_id, error = %e, "User lookup task failed");
        None
    })
}
