//! Admission check for operations that must reference a live user.
//!
//! Fails closed: if the user service cannot confirm the user, for whatever
//! reason, the operation is refused.

use std::sync::Arc;

use thiserror::Error;

use registry_core::UserId;

use super::UserLookup;

/// The user could not be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user {user_id} could not be confirmed by the user service")]
pub struct GateRejection {
    pub user_id: UserId,
}

/// Refuses operations on users the user service does not vouch for.
#[derive(Clone)]
pub struct ValidationGate {
    lookup: Arc<dyn UserLookup>,
}

impl ValidationGate {
    /// Create a gate over a lookup client.
    #[must_use]
    pub fn new(lookup: Arc<dyn UserLookup>) -> Self {
        Self { lookup }
    }

    /// Admit `user_id` only if the user service confirms it exists.
    ///
    /// # Errors
    ///
    /// Returns `GateRejection` when the user is missing or the user service
    /// is unreachable; the two cases are not told apart.
    pub async fn admit(&self, user_id: UserId) -> Result<(), GateRejection> {
        if self.lookup.exists(user_id).await {
            Ok(())
        } else {
            tracing::info!(user_id = %user_id, "User not confirmed, rejecting");
            Err(GateRejection { user_id })
        }
    }
}
