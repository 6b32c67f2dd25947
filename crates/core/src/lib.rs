//! Registry Core - Shared types library.
//!
//! This crate provides common types used across the registry components:
//! - `users` - User registry service (owns the `usuarios` table)
//! - `orders` - Order registry service (owns the `pedidos` table)
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate holds types plus the environment and pool plumbing both
//! services repeat - no table access, no HTTP clients. The order service and
//! the user service share nothing at runtime except the JSON contract defined
//! here.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, order status, the response envelope and
//!   the cross-service [`UserSummary`]
//! - `config` - Environment helpers and the shared database settings
//!   (requires the `postgres` feature)
//! - `db` - `RepositoryError`, pool creation and `LIKE` escaping
//!   (requires the `postgres` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

#[cfg(feature = "postgres")]
pub mod config;
#[cfg(feature = "postgres")]
pub mod db;
pub mod types;

pub use types::*;
