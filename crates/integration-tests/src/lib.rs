//! Cross-service test harness.
//!
//! Starts both services in-process on ephemeral ports, backed by the
//! in-memory stores, with the order service talking to the user service over
//! real HTTP. No database is needed.
//!
//! ```rust,ignore
//! let ctx = TestContext::start().await?;
//! let resp = ctx.client.get(ctx.orders("/pedidos")).send().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use url::Url;

use registry_orders::db::MemoryOrderStore;
use registry_orders::services::{HttpUserLookup, LookupError};
use registry_users::db::MemoryUserStore;

/// Errors starting the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("lookup client: {0}")]
    Lookup(#[from] LookupError),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Both services running, plus handles on their stores.
pub struct TestContext {
    pub client: reqwest::Client,
    pub users_url: String,
    pub orders_url: String,
    pub order_store: Arc<MemoryOrderStore>,
}

impl TestContext {
    /// Start the user service and an order service pointed at it.
    ///
    /// # Errors
    ///
    /// Returns error if a listener cannot bind or a client cannot be built.
    pub async fn start() -> Result<Self, HarnessError> {
        let users_state =
            registry_users::state::AppState::new(Arc::new(MemoryUserStore::new()));
        let users_addr = serve(registry_users::routes::app(users_state)).await?;

        Self::with_user_service(&format!("http://{users_addr}")).await
    }

    /// Start only the order service, pointed at a port nothing listens on.
    ///
    /// # Errors
    ///
    /// Returns error if a listener cannot bind or a client cannot be built.
    pub async fn without_user_service() -> Result<Self, HarnessError> {
        let dead = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = dead.local_addr()?;
        drop(dead);

        Self::with_user_service(&format!("http://{addr}")).await
    }

    async fn with_user_service(users_url: &str) -> Result<Self, HarnessError> {
        let order_store = Arc::new(MemoryOrderStore::new());
        let lookup = HttpUserLookup::new(&Url::parse(users_url)?)?;
        let orders_state = registry_orders::state::AppState::new(
            order_store.clone(),
            Arc::new(lookup),
            users_url,
        );
        let orders_addr = serve(registry_orders::routes::app(orders_state)).await?;

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            users_url: users_url.to_owned(),
            orders_url: format!("http://{orders_addr}"),
            order_store,
        })
    }

    /// Absolute URL on the user service.
    #[must_use]
    pub fn users(&self, path: &str) -> String {
        format!("{}{path}", self.users_url)
    }

    /// Absolute URL on the order service.
    #[must_use]
    pub fn orders(&self, path: &str) -> String {
        format!("{}{path}", self.orders_url)
    }
}

/// Serve `app` on an ephemeral port for the rest of the test.
async fn serve(app: axum::Router) -> Result<SocketAddr, HarnessError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}
