//! Flow simulation
//!
//! Fabricates synthetic [`NetworkFlow`](crate::types::NetworkFlow) records,
//! keeps them in a bounded newest-first store and derives rolling counters
//! from the live list.

pub mod generator;
pub mod stats;
pub mod store;

pub use generator::FlowGenerator;
pub use stats::compute_statistics;
pub use store::{FlowFilter, FlowStore};
