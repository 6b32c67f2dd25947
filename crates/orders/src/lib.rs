//! Order registry service library.
//!
//! Owns the `pedidos` table and depends on the user service for two things:
//! confirming a user exists before an order is written (see
//! [`services::ValidationGate`]) and attaching user details to every order
//! read (see [`services::Enricher`]). The first fails closed, the second
//! fails open.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
