//! Helpers for partial-update request bodies.
//!
//! Nullable columns need three states in a patch: absent (leave unchanged),
//! `null` (clear), and a value (set). Model them as `Option<Option<T>>` and
//! annotate the field with:
//!
//! ```rust
//! # use serde::Deserialize;
//! #[derive(Deserialize)]
//! struct Patch {
//!     #[serde(default, deserialize_with = "registry_core::patch::present")]
//!     telefono: Option<Option<String>>,
//! }
//!
//! let cleared: Patch = serde_json::from_str(r#"{"telefono": null}"#).unwrap();
//! assert_eq!(cleared.telefono, Some(None));
//!
//! let absent: Patch = serde_json::from_str("{}").unwrap();
//! assert_eq!(absent.telefono, None);
//! ```

use serde::{Deserialize, Deserializer};

/// Deserialize a field that is present in the input, wrapping it in `Some`.
///
/// Combined with `#[serde(default)]`, an absent key stays `None` while an
/// explicit `null` becomes `Some(None)`.
///
/// # Errors
///
/// Propagates the inner type's deserialization error.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
