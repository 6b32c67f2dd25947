//! Domain models for the order service.

pub mod order;

pub use order::{
    DEFAULT_LIMIT, DetailedOrderStats, EnrichedOrder, NewOrder, Order, OrderFilter, OrderPatch, OrderStats, Page,
};
