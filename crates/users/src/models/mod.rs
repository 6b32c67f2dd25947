//! Domain models for the user registry.

pub mod user;

pub use user::{NewUser, User, UserPatch};
