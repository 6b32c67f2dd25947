//! Data access for the user registry.
//!
//! # Table: `usuarios`
//!
//! Owned exclusively by this service. The order service never touches it;
//! it reads users over HTTP only.
//!
//! # Stores
//!
//! - [`PgUserStore`] - `PostgreSQL` implementation used in production
//! - [`MemoryUserStore`] - in-process implementation for tests and local demos
//!
//! # Migrations
//!
//! Migrations are stored in `crates/users/migrations/` and run via:
//! ```bash
//! cargo run -p registry-cli -- migrate users
//! ```

pub mod memory;
pub mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use registry_core::UserId;
pub use registry_core::db::{
    RepositoryError, check_connection, classify_write_error, create_pool,
};

use crate::models::{NewUser, User, UserPatch};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Message used for duplicate-email conflicts.
pub const DUPLICATE_EMAIL: &str = "El email ya está registrado";

/// Width of `usuarios.nombre`.
pub const NAME_MAX_CHARS: usize = 100;

/// Width of `usuarios.telefono`.
pub const PHONE_MAX_CHARS: usize = 30;

/// Persistence port for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, ordered by id ascending.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// A single user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this id.
    async fn get(&self, id: UserId) -> Result<User, RepositoryError>;

    /// Users whose name or email contains `term` (case-insensitive), ordered
    /// by name.
    async fn search(&self, term: &str) -> Result<Vec<User>, RepositoryError>;

    /// Insert a user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the name is blank, `Conflict` if the email exists.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty patch or blank name, `NotFound` if the
    /// user is absent, `Conflict` if the new email belongs to someone else.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError>;

    /// Delete a user and return the deleted snapshot.
    ///
    /// Orders that reference the user are left alone.
    async fn delete(&self, id: UserId) -> Result<User, RepositoryError>;

    /// Check that the backing storage is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Reject a new user whose name is blank or whose fields overflow their
/// columns.
pub(crate) fn check_new_user(user: &NewUser) -> Result<(), RepositoryError> {
    if user.name.trim().is_empty() {
        return Err(RepositoryError::InvalidInput(
            "Nombre y email son requeridos".to_owned(),
        ));
    }
    check_name_length(&user.name)?;
    check_phone_length(user.phone.as_deref())
}

/// Reject an empty patch, one that blanks the name, or one whose values
/// overflow their columns.
pub(crate) fn check_patch(patch: &UserPatch) -> Result<(), RepositoryError> {
    if patch.is_empty() {
        return Err(RepositoryError::InvalidInput(
            "No se proporcionaron campos para actualizar".to_owned(),
        ));
    }
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(RepositoryError::InvalidInput(
                "El nombre no puede estar vacío".to_owned(),
            ));
        }
        check_name_length(name)?;
    }
    if let Some(phone) = &patch.phone {
        check_phone_length(phone.as_deref())?;
    }
    Ok(())
}

fn check_name_length(name: &str) -> Result<(), RepositoryError> {
    if name.trim().chars().count() > NAME_MAX_CHARS {
        return Err(RepositoryError::InvalidInput(format!(
            "El nombre no puede superar {NAME_MAX_CHARS} caracteres"
        )));
    }
    Ok(())
}

fn check_phone_length(phone: Option<&str>) -> Result<(), RepositoryError> {
    if phone.is_some_and(|p| p.chars().count() > PHONE_MAX_CHARS) {
        return Err(RepositoryError::InvalidInput(format!(
            "El teléfono no puede superar {PHONE_MAX_CHARS} caracteres"
        )));
    }
    Ok(())
}

/// Apply the embedded `usuarios` migrations.
///
/// Both services may share one database, so migrations recorded by the other
/// service are ignored rather than treated as missing.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use registry_core::Email;

    use super::*;

    #[test]
    fn test_check_patch_rejects_empty_and_blank_name() {
        assert!(matches!(
            check_patch(&UserPatch::default()),
            Err(RepositoryError::InvalidInput(_))
        ));

        let blank = UserPatch {
            name: Some("   ".to_owned()),
            ..UserPatch::default()
        };
        assert!(matches!(
            check_patch(&blank),
            Err(RepositoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_lengths_are_bounded_by_column_widths() {
        let email = Email::parse("ana@example.com").unwrap();
        let user = |name: String, phone: Option<String>| NewUser {
            name,
            email: email.clone(),
            phone,
            age: None,
        };

        // Counted in characters, not bytes.
        let widest = "ñ".repeat(NAME_MAX_CHARS);
        assert!(check_new_user(&user(widest.clone(), Some("5".repeat(PHONE_MAX_CHARS)))).is_ok());

        let long_name = "a".repeat(NAME_MAX_CHARS + 1);
        assert!(matches!(
            check_new_user(&user(long_name.clone(), None)),
            Err(RepositoryError::InvalidInput(_))
        ));
        let long_phone = "5".repeat(PHONE_MAX_CHARS + 1);
        assert!(matches!(
            check_new_user(&user(widest, Some(long_phone.clone()))),
            Err(RepositoryError::InvalidInput(_))
        ));

        let rename = UserPatch {
            name: Some(long_name),
            ..UserPatch::default()
        };
        assert!(matches!(
            check_patch(&rename),
            Err(RepositoryError::InvalidInput(_))
        ));
        let rephone = UserPatch {
            phone: Some(Some(long_phone)),
            ..UserPatch::default()
        };
        assert!(matches!(
            check_patch(&rephone),
            Err(RepositoryError::InvalidInput(_))
        ));
        let clear_phone = UserPatch {
            phone: Some(None),
            ..UserPatch::default()
        };
        assert!(check_patch(&clear_phone).is_ok());
    }
}
