//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::UserStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable; the store sits behind an `Arc` so handlers and tests
/// can swap the `PostgreSQL` store for the in-memory one.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn UserStore>,
}

impl AppState {
    /// Create a new application state around a user store.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Get the user store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }
}
