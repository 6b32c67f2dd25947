//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::OrderStore;
use crate::services::{Enricher, UserLookup, ValidationGate};

/// Application state shared across all handlers.
///
/// The enricher and the gate share one lookup client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn OrderStore>,
    enricher: Enricher,
    gate: ValidationGate,
    user_service_url: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `store` - Order persistence
    /// * `lookup` - Client for the user service
    /// * `user_service_url` - Reported by `/health`
    #[must_use]
    pub fn new(
        store: Arc<dyn OrderStore>,
        lookup: Arc<dyn UserLookup>,
        user_service_url: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                enricher: Enricher::new(Arc::clone(&lookup)),
                gate: ValidationGate::new(lookup),
                user_service_url: user_service_url.into(),
            }),
        }
    }

    /// Get the order store.
    #[must_use]
    pub fn store(&self) -> &dyn OrderStore {
        self.inner.store.as_ref()
    }

    /// Get the enrichment orchestrator.
    #[must_use]
    pub fn enricher(&self) -> &Enricher {
        &self.inner.enricher
    }

    /// Get the validation gate.
    #[must_use]
    pub fn gate(&self) -> &ValidationGate {
        &self.inner.gate
    }

    /// Base URL of the user service, as configured.
    #[must_use]
    pub fn user_service_url(&self) -> &str {
        &self.inner.user_service_url
    }
}
