//! Network flow records
//!
//! A [`NetworkFlow`] represents one simulated network connection. Flows are
//! fabricated by the generator each tick; except for an operator blocking
//! the flow, they are immutable once stored.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::protocols::Protocol;

/// Flow status as shown on the monitoring board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    #[default]
    Normal,
    Warning,
    Critical,
    Blocked,
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStatus::Normal => write!(f, "normal"),
            FlowStatus::Warning => write!(f, "warning"),
            FlowStatus::Critical => write!(f, "critical"),
            FlowStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Direction of a flow relative to the protected network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Inbound,
    Outbound,
    Lateral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
            Direction::Lateral => write!(f, "lateral"),
        }
    }
}

/// Threat classification stamped on a flow by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    #[default]
    None,
    PortScan,
    Ddos,
    Exfiltration,
    Malware,
    BruteForce,
    Apt,
    Anomaly,
}

impl ThreatType {
    /// Threat types the critical branch of the generator picks from
    pub const CRITICAL_TYPES: [ThreatType; 6] = [
        ThreatType::PortScan,
        ThreatType::Ddos,
        ThreatType::Exfiltration,
        ThreatType::Malware,
        ThreatType::BruteForce,
        ThreatType::Apt,
    ];
}

impl std::fmt::Display for ThreatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatType::None => write!(f, "none"),
            ThreatType::PortScan => write!(f, "port_scan"),
            ThreatType::Ddos => write!(f, "ddos"),
            ThreatType::Exfiltration => write!(f, "exfiltration"),
            ThreatType::Malware => write!(f, "malware"),
            ThreatType::BruteForce => write!(f, "brute_force"),
            ThreatType::Apt => write!(f, "apt"),
            ThreatType::Anomaly => write!(f, "anomaly"),
        }
    }
}

/// Synthetic ML verdict attached to flows with an elevated threat score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub is_anomaly: bool,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub category: ThreatType,
    pub model_used: String,
}

/// One simulated network connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkFlow {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,

    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub protocol: Protocol,
    pub direction: Direction,

    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u32,
    pub packets_out: u32,
    /// Connection duration in milliseconds
    pub duration_ms: u64,

    pub status: FlowStatus,
    pub threat_type: ThreatType,
    /// 0-100
    pub threat_score: u8,

    pub geo_source: Option<String>,
    pub geo_destination: Option<String>,
    pub application_layer: Option<String>,
    pub ml_prediction: Option<MlPrediction>,
}

impl NetworkFlow {
    /// Whether the generator tagged this flow with a threat
    pub fn is_threat(&self) -> bool {
        self.threat_type != ThreatType::None
    }

    /// Total bytes transferred in both directions
    pub fn total_bytes(&self) -> u64 {
        self.bytes_in + self.bytes_out
    }

    /// Total packets transferred in both directions
    pub fn total_packets(&self) -> u64 {
        self.packets_in as u64 + self.packets_out as u64
    }
}
