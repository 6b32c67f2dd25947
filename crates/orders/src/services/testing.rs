//! Scripted [`UserLookup`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use registry_core::{UserId, UserSummary};

use super::UserLookup;

/// Answers from a fixed table, optionally after a per-user delay, and counts
/// calls.
#[derive(Default)]
pub struct ScriptedLookup {
    users: HashMap<UserId, UserSummary>,
    delays: HashMap<UserId, Duration>,
    panics_for: Option<UserId>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i32, name: &str) -> Self {
        let id = UserId::new(id);
        self.users.insert(
            id,
            UserSummary {
                id,
                name: name.to_owned(),
                email: format!("{}@x.com", name.to_lowercase()),
                phone: None,
            },
        );
        self
    }

    pub fn with_delay(mut self, id: i32, delay: Duration) -> Self {
        self.delays.insert(UserId::new(id), delay);
        self
    }

    pub fn panicking_for(mut self, id: i32) -> Self {
        self.panics_for = Some(UserId::new(id));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserLookup for ScriptedLookup {
    async fn lookup(&self, user_id: UserId) -> Option<UserSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&user_id) {
            tokio::time::sleep(*delay).await;
        }
        assert!(self.panics_for != Some(user_id), "lookup exploded");
        self.users.get(&user_id).cloned()
    }
}
