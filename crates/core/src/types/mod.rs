//! Core types shared by the user and order services.
//!
//! This module provides type-safe wrappers for domain concepts and the JSON
//! contract both services speak.

pub mod email;
pub mod envelope;
pub mod id;
pub mod patch;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use envelope::Envelope;
pub use id::*;
pub use status::OrderStatus;
pub use user::UserSummary;
