//! Database migration commands.
//!
//! Each service embeds its own migrations (`crates/users/migrations/`,
//! `crates/orders/migrations/`). Both may target the same database; each
//! migrator ignores versions applied by the other.

use sqlx::PgPool;
use thiserror::Error;

use registry_core::config::{ConfigError, DatabaseConfig};
use registry_core::db::create_pool;

/// Errors from a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

async fn connect() -> Result<PgPool, MigrationError> {
    let _ = dotenvy::dotenv();

    let database = DatabaseConfig::from_env()?;
    tracing::info!("Connecting to database...");
    Ok(create_pool(database.connect_options()?).await?)
}

/// Run user service migrations.
pub async fn users() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running user service migrations...");
    registry_users::db::run_migrations(&pool).await?;

    tracing::info!("User service migrations complete!");
    Ok(())
}

/// Run order service migrations.
pub async fn orders() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running order service migrations...");
    registry_orders::db::run_migrations(&pool).await?;

    tracing::info!("Order service migrations complete!");
    Ok(())
}

/// Run user then order migrations over one pool.
pub async fn all() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running user service migrations...");
    registry_users::db::run_migrations(&pool).await?;
    tracing::info!("Running order service migrations...");
    registry_orders::db::run_migrations(&pool).await?;

    tracing::info!("All migrations complete!");
    Ok(())
}
