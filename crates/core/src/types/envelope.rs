//! Response envelope shared by both services.
//!
//! Every response body, success or failure, has the shape
//! `{success, data?, total?, message?, error?, details?, ...}`. Route-specific
//! keys such as `filters` or `termino_busqueda` are carried in [`Envelope::meta`]
//! and flattened into the top-level object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Number of items in `data` for list endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Human-readable confirmation for mutating endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Client-facing error summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnostic detail for server errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Additional route-specific top-level keys.
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            message: None,
            error: None,
            details: None,
            meta: Map::new(),
        }
    }

    /// Attach a confirmation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a route-specific top-level key.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_owned(), value.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// A successful list response; `total` is the length of `items`.
    #[must_use]
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        let mut envelope = Self::ok(items);
        envelope.total = Some(total);
        envelope
    }
}

impl Envelope<()> {
    /// A successful response with no payload, only a message.
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            total: None,
            message: Some(message.into()),
            error: None,
            details: None,
            meta: Map::new(),
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            message: None,
            error: Some(error.into()),
            details,
            meta: Map::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_sets_total_and_meta_flattens() {
        let envelope = Envelope::list(vec![1, 2, 3]).with_meta("termino_busqueda", "bo");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "data": [1, 2, 3], "total": 3, "termino_busqueda": "bo"})
        );
    }

    #[test]
    fn test_failure_omits_data() {
        let value = serde_json::to_value(Envelope::failure("Pedido no encontrado", None)).unwrap();
        assert_eq!(value, json!({"success": false, "error": "Pedido no encontrado"}));
    }

    #[test]
    fn test_deserialize_without_data() {
        let envelope: Envelope<Value> =
            serde_json::from_value(json!({"success": false, "error": "Usuario no encontrado"}))
                .unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("Usuario no encontrado"));
    }
}
