//! Client for the user service.
//!
//! A lookup either yields a [`UserSummary`] or nothing. Transport failures,
//! timeouts, non-2xx answers and undecodable bodies all collapse to `None`;
//! callers decide whether absence is fatal (the validation gate) or not
//! (enrichment).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use registry_core::{Envelope, UserId, UserSummary};

/// Upper bound on a single lookup, connect through body.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors building the lookup client.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Read-only view of the user registry.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Fetch one user. Never fails; every problem is `None`.
    async fn lookup(&self, user_id: UserId) -> Option<UserSummary>;

    /// Whether the user service confirms the user exists.
    ///
    /// An unreachable service and a missing user are indistinguishable here.
    async fn exists(&self, user_id: UserId) -> bool {
        self.lookup(user_id).await.is_some()
    }
}

/// HTTP implementation of [`UserLookup`] against `GET {base}/usuarios/{id}`.
#[derive(Clone)]
pub struct HttpUserLookup {
    inner: Arc<HttpUserLookupInner>,
}

struct HttpUserLookupInner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserLookup {
    /// Create a client with the standard [`LOOKUP_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, LookupError> {
        Self::with_timeout(base_url, LOOKUP_TIMEOUT)
    }

    /// Create a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_timeout(base_url: &Url, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpUserLookupInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        })
    }

    fn user_url(&self, user_id: UserId) -> String {
        format!("{}/usuarios/{user_id}", self.inner.base_url)
    }
}

#[async_trait]
impl UserLookup for HttpUserLookup {
    async fn lookup(&self, user_id: UserId) -> Option<UserSummary> {
        let url = self.user_url(user_id);

        let response = match self.inner.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    timeout = e.is_timeout(),
                    "User service unreachable"
                );
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                user_id = %user_id,
                status = status.as_u16(),
                "User service did not return the user"
            );
            return None;
        }

        match response.json::<Envelope<UserSummary>>().await {
            Ok(envelope) if envelope.success && envelope.data.is_some() => envelope.data,
            Ok(envelope) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = envelope.error.as_deref().unwrap_or_default(),
                    "User service answered without a user"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    timeout = e.is_timeout(),
                    "Undecodable user service response"
                );
                None
            }
        }
    }
}
