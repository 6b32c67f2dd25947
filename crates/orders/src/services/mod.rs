//! Cross-service logic: user lookups, enrichment and the validation gate.

pub mod enrichment;
pub mod user_lookup;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use enrichment::Enricher;
pub use user_lookup::{HttpUserLookup, LOOKUP_TIMEOUT, LookupError, UserLookup};
pub use validation::{GateRejection, ValidationGate};
