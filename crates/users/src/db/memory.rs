//! In-process user store.
//!
//! Mirrors the `PostgreSQL` store's behavior (id assignment, unique emails,
//! ordering) closely enough for handler and cross-service tests to run
//! without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use registry_core::UserId;

use super::{DUPLICATE_EMAIL, RepositoryError, UserStore, check_new_user, check_patch};
use crate::models::{NewUser, User, UserPatch};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    users: BTreeMap<UserId, User>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_str() == email && Some(u.id) != except)
    }
}

/// User store held in memory behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store. The first user gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, RepositoryError> {
        let needle = term.to_lowercase();
        let inner = self.inner.read().await;
        let mut found: Vec<User> = inner
            .users
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.as_str().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        check_new_user(&user)?;

        let mut inner = self.inner.write().await;
        if inner.email_taken(user.email.as_str(), None) {
            return Err(RepositoryError::Conflict(DUPLICATE_EMAIL.to_owned()));
        }

        inner.next_id += 1;
        let created = User {
            id: UserId::new(inner.next_id),
            name: user.name.trim().to_owned(),
            email: user.email,
            phone: user.phone,
            age: user.age,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, RepositoryError> {
        check_patch(&patch)?;

        let mut inner = self.inner.write().await;
        if let Some(email) = &patch.email
            && inner.email_taken(email.as_str(), Some(id))
        {
            return Err(RepositoryError::Conflict(DUPLICATE_EMAIL.to_owned()));
        }

        let user = inner.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        patch.apply_to(user);
        user.name = user.name.trim().to_owned();
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        self.inner
            .write()
            .await
            .users
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
