//! Derived statistics snapshots

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::alert::{MitreTactic, ThreatCategory};

/// Rolling flow counters, recomputed from the live flow list every stats tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowStatistics {
    /// Flows currently held in the store
    pub total_flows: usize,
    /// Flows observed within the trailing one-second window
    pub flows_per_second: usize,
    /// Bytes (both directions) within the trailing one-second window
    pub bytes_per_second: u64,
    /// Packets (both directions) within the trailing one-second window
    pub packets_per_second: u64,
    /// Flows with status `normal`
    pub active_connections: usize,
    /// Flows with status `blocked`
    pub blocked_connections: usize,
    /// Flows carrying a threat type other than `none`
    pub threats_detected: usize,
    /// Flows whose ML stub reports an anomaly
    pub anomalies_detected: usize,
}

/// Count of alerts per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: ThreatCategory,
    pub count: usize,
}

/// Count of alerts per source IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIpCount {
    pub ip: IpAddr,
    pub count: usize,
}

/// Count of alerts per MITRE tactic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticCount {
    pub tactic: MitreTactic,
    pub count: usize,
}

/// Alert rollup, a pure function of the current alert list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThreatStatistics {
    pub total_alerts: usize,
    pub new_alerts: usize,
    pub investigating_alerts: usize,
    pub contained_alerts: usize,
    pub resolved_alerts: usize,
    pub false_positives: usize,

    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub info_count: usize,

    /// Top 5 categories by alert count, descending
    pub top_categories: Vec<CategoryCount>,
    /// Top 5 source IPs by alert count, descending
    pub top_source_ips: Vec<SourceIpCount>,
    /// Top 5 MITRE tactics by alert count, descending
    pub top_mitre_tactics: Vec<TacticCount>,
}
