//! Type definitions for the sentinel-soc simulation pipeline
//!
//! This module provides the core data model shared by the flow generator,
//! the threat classifier and the in-memory stores.
//!
//! ## Key types
//!
//! - [`NetworkFlow`] - one simulated network connection
//! - [`ThreatAlert`] - alert raised from a qualifying flow
//! - [`Ioc`] - indicator of compromise, deduplicated by (type, value)
//! - [`FlowStatistics`] / [`ThreatStatistics`] - derived snapshots

pub mod alert;
pub mod flow;
pub mod protocols;
pub mod statistics;

// Re-export all public types at module root
pub use alert::{
    ActionStatus, ActionType, AlertStatus, Ioc, IocType, MitreMapping, MitreTactic, Severity,
    ThreatAction, ThreatAlert, ThreatCategory, ThreatNote,
};
pub use flow::{Direction, FlowStatus, MlPrediction, NetworkFlow, ThreatType};
pub use protocols::Protocol;
pub use statistics::{
    CategoryCount, FlowStatistics, SourceIpCount, TacticCount, ThreatStatistics,
};
