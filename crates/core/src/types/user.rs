//! Cross-service user contract.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// The part of a user record the order service reads from the user service.
///
/// Deserialized from `GET /usuarios/{id}`; unknown keys (such as `edad`) are
/// ignored so the user service can grow its schema independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Contact email. Kept as a plain string: this is display data owned by
    /// another service, not something this side validates.
    pub email: String,
    /// Optional phone number.
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let summary: UserSummary = serde_json::from_value(json!({
            "id": 1,
            "nombre": "Ana",
            "email": "ana@x.com",
            "edad": 30
        }))
        .unwrap();
        assert_eq!(summary.id, UserId::new(1));
        assert_eq!(summary.name, "Ana");
        assert_eq!(summary.phone, None);
    }
}
