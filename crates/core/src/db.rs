//! Database plumbing shared by both services.
//!
//! Each service owns its own table and store; this module holds only the
//! error type, pool setup and query helpers they have in common.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The caller supplied missing or malformed fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RepositoryError {
    /// Whether this error is the server's fault rather than the caller's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::DataCorruption(_))
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// Checkouts queue for up to 10 seconds when all 10 connections are busy.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(options: PgConnectOptions) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run a trivial query to prove the database answers.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn check_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Build an `ILIKE ... ESCAPE '\'` pattern matching `term` anywhere, with
/// `%`, `_` and `\` in `term` matched literally.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Client-facing message for a value the table's column types or `CHECK`
/// constraints refuse, keyed by SQLSTATE.
fn rejected_value_message(sqlstate: &str) -> Option<&'static str> {
    match sqlstate {
        // string_data_right_truncation
        "22001" => Some("Un campo excede la longitud permitida"),
        // numeric_value_out_of_range
        "22003" => Some("Valor numérico fuera de rango"),
        // check_violation
        "23514" => Some("Un valor no cumple las restricciones de la tabla"),
        _ => None,
    }
}

/// Map a failed `INSERT`/`UPDATE`: values refused by the column types or
/// `CHECK` constraints become `InvalidInput`, anything else stays a
/// database error.
#[must_use]
pub fn classify_write_error(e: sqlx::Error) -> RepositoryError {
    let message = match &e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref().and_then(rejected_value_message),
        _ => None,
    };
    match message {
        Some(message) => RepositoryError::InvalidInput(message.to_owned()),
        None => RepositoryError::Database(e),
    }
}
