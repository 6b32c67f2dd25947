//! Environment helpers and database settings shared by both services and the
//! CLI.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - Full `PostgreSQL` connection string. When set, the
//!   individual `DB_*` variables are ignored.
//! - `DB_HOST` - Database host (default: localhost)
//! - `DB_PORT` - Database port (default: 5432)
//! - `DB_USER` - Database user (default: `app_user`)
//! - `DB_PASSWORD` - Database password (default: root)
//! - `DB_NAME` - Database name (default: `usuarios_db`)

use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where to find the database.
#[derive(Clone)]
pub enum DatabaseConfig {
    /// A complete connection string from `DATABASE_URL`.
    Url(SecretString),
    /// Connection settings assembled from the `DB_*` variables.
    Parts {
        host: String,
        port: u16,
        user: String,
        password: SecretString,
        name: String,
    },
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(_) => f.debug_tuple("Url").field(&"[REDACTED]").finish(),
            Self::Parts {
                host,
                port,
                user,
                name,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"[REDACTED]")
                .field("name", name)
                .finish(),
        }
    }
}

impl DatabaseConfig {
    /// Load database settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `DATABASE_URL` is not a valid
    /// `PostgreSQL` connection string or `DB_PORT` is not a port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Some(url) = get_optional_env("DATABASE_URL") {
            PgConnectOptions::from_str(&url).map_err(|e| {
                ConfigError::InvalidEnvVar("DATABASE_URL".to_string(), e.to_string())
            })?;
            return Ok(Self::Url(SecretString::from(url)));
        }

        Ok(Self::Parts {
            host: get_env_or_default("DB_HOST", "localhost"),
            port: parse_env_or_default("DB_PORT", "5432")?,
            user: get_env_or_default("DB_USER", "app_user"),
            password: SecretString::from(get_env_or_default("DB_PASSWORD", "root")),
            name: get_env_or_default("DB_NAME", "usuarios_db"),
        })
    }

    /// Build sqlx connection options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the stored URL does not parse.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            Self::Url(url) => PgConnectOptions::from_str(url.expose_secret()).map_err(|e| {
                ConfigError::InvalidEnvVar("DATABASE_URL".to_string(), e.to_string())
            }),
            Self::Parts {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password.expose_secret())
                .database(name)),
        }
    }
}

/// Get an optional environment variable. Empty values count as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
pub fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
