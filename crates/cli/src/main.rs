//! Registry CLI - database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Create the usuarios table
//! registry-cli migrate users
//!
//! # Create the pedidos table
//! registry-cli migrate orders
//!
//! # Both, users first
//! registry-cli migrate all
//! ```
//!
//! The connection is configured exactly as the services configure theirs:
//! `DATABASE_URL`, or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(author, version, about = "User and order registry CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum MigrateTarget {
    /// Run user service migrations (`usuarios`)
    Users,
    /// Run order service migrations (`pedidos`)
    Orders,
    /// Run all migrations
    All,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Users => commands::migrate::users().await,
            MigrateTarget::Orders => commands::migrate::orders().await,
            MigrateTarget::All => commands::migrate::all().await,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_migrate_targets() {
        for (arg, expected) in [
            ("users", MigrateTarget::Users),
            ("orders", MigrateTarget::Orders),
            ("all", MigrateTarget::All),
        ] {
            let cli = Cli::try_parse_from(["registry-cli", "migrate", arg]).unwrap();
            let Commands::Migrate { target } = cli.command;
            assert_eq!(target, expected);
        }

        assert!(Cli::try_parse_from(["registry-cli", "migrate", "admin"]).is_err());
    }
}
