//! `PostgreSQL` user store.
//!
//! Queries are built at runtime (`query_as` and `QueryBuilder`) so the crate
//! compiles without a live database.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use registry_core::db::like_pattern;
use registry_core::{Email, UserId};

use super::{
    DUPLICATE_EMAIL, RepositoryError, UserStore, check_new_user, check_patch, classify_write_error,
};
use crate::models::{NewUser, User, UserPatch};

const USER_COLUMNS: &str = "id, nombre, email, telefono, edad";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    nombre: String,
    email: String,
    telefono: Option<String>,
    edad: Option<i32>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.nombre,
            email,
            phone: row.telefono,
            age: row.edad,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, RepositoryError> {
    rows.into_iter().map(User::try_from).collect()
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(DUPLICATE_EMAIL.to_owned());
    }
    classify_write_error(e)
}

/// User store backed by the `usuarios` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_users(rows)
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r"SELECT {USER_COLUMNS} FROM usuarios
              WHERE nombre ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
              ORDER BY nombre, id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;

        into_users(rows)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        check_new_user(&user)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO usuarios (nombre, email, telefono, edad)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.name.trim())
        .bind(user.email.as_str())
        .bind(user.phone)
        .bind(user.age)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.try_into()
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        check_patch(&patch)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE usuarios SET ");
        let mut set = builder.separated(", ");
        if let Some(name) = patch.name {
            set.push("nombre = ");
            set.push_bind_unseparated(name.trim().to_owned());
        }
        if let Some(email) = patch.email {
            set.push("email = ");
            set.push_bind_unseparated(email.into_inner());
        }
        if let Some(phone) = patch.phone {
            set.push("telefono = ");
            set.push_bind_unseparated(phone);
        }
        if let Some(age) = patch.age {
            set.push("edad = ");
            set.push_bind_unseparated(age);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(USER_COLUMNS);

        let row = builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "DELETE FROM usuarios WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        super::check_connection(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_corrupt_email_is_rejected() {
        let row = UserRow {
            id: 1,
            nombre: "Ana".to_owned(),
            email: "not-an-email".to_owned(),
            telefono: None,
            edad: None,
        };
        assert!(matches!(
            User::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database at DATABASE_URL"]
    async fn test_create_then_duplicate_email_conflicts() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        super::super::run_migrations(&pool).await.unwrap();
        let store = PgUserStore::new(pool);

        let new_user = NewUser {
            name: "Duplicada".to_owned(),
            email: Email::parse(&format!("dup-{}@example.com", uuid::Uuid::new_v4())).unwrap(),
            phone: None,
            age: None,
        };
        let created = store.create(new_user.clone()).await.unwrap();
        assert!(matches!(
            store.create(new_user).await,
            Err(RepositoryError::Conflict(_))
        ));

        store.delete(created.id).await.unwrap();
    }
}
