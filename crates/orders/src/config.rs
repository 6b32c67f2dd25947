//! Order service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ORDER_SERVICE_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDER_SERVICE_PORT` - Listen port (default: 5002)
//! - `USER_SERVICE_URL` - Base URL of the user service
//!   (default: `http://localhost:5001`)
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`
//!   - see [`registry_core::config::DatabaseConfig`]
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)

use std::net::{IpAddr, SocketAddr};

pub use registry_core::config::{ConfigError, DatabaseConfig};
use registry_core::config::{get_env_or_default, get_optional_env, parse_env_or_default};
use url::Url;

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the user service
    pub user_service_url: Url,
    /// Database location (password redacted in `Debug`)
    pub database: DatabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: String,
}

impl OrdersConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_env_or_default("ORDER_SERVICE_HOST", "127.0.0.1")?,
            port: parse_env_or_default("ORDER_SERVICE_PORT", "5002")?,
            user_service_url: parse_service_url(&get_env_or_default(
                "USER_SERVICE_URL",
                "http://localhost:5001",
            ))?,
            database: DatabaseConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_env_or_default("SENTRY_ENVIRONMENT", "development"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse the user service base URL; only `http` and `https` are accepted.
fn parse_service_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("USER_SERVICE_URL".to_string(), reason);

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
