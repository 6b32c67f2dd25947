//! User registry service library.
//!
//! Owns the `usuarios` table and exposes it over HTTP. The binary in
//! `main.rs` wires configuration, the `PostgreSQL` store and telemetry around
//! [`routes::app`]; tests drive the same router over [`db::MemoryUserStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
