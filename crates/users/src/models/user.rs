//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types and from request bodies.

use serde::{Deserialize, Serialize};

use registry_core::{Email, UserId};

/// A registered user.
///
/// Serialized with the registry's Spanish wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned ID, immutable.
    pub id: UserId,
    /// Display name (never empty).
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unique, normalized email.
    pub email: Email,
    /// Optional phone number.
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Optional age.
    #[serde(rename = "edad")]
    pub age: Option<i32>,
}

/// Fields for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub age: Option<i32>,
}

/// A partial update. `None` leaves a field unchanged; for the nullable
/// columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<Option<String>>,
    pub age: Option<Option<i32>>,
}

impl UserPatch {
    /// Whether no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.age.is_none()
    }

    /// Apply the supplied fields to `user`, leaving the rest untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone.clone_from(phone);
        }
        if let Some(age) = self.age {
            user.age = age;
        }
    }
}
