//! Network configuration provider
//!
//! Supplies the IP pools, protocol set and branch probabilities the flow
//! generator runs against, derived from the selected network profile and
//! the current alert level. Also tracks the simulated node inventory and
//! the discovery-scan progress counter.

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::Protocol;

fn ip(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

/// Kind of network being monitored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    #[default]
    Enterprise,
    Tactical,
    Strategic,
    Intelligence,
    Industrial,
    Logistics,
    CyberDefense,
}

/// Intrinsic risk level of a network profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Multiplier applied to both branch probabilities
    fn probability_factor(self) -> f64 {
        match self {
            RiskLevel::Critical => 1.5,
            RiskLevel::High => 1.25,
            _ => 1.0,
        }
    }
}

/// Operator-selected alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Base (threat, critical) branch probabilities for this level
    pub fn probabilities(self) -> (f64, f64) {
        match self {
            AlertLevel::Low => (0.05, 0.02),
            AlertLevel::Medium => (0.10, 0.05),
            AlertLevel::High => (0.15, 0.08),
            AlertLevel::Critical => (0.25, 0.12),
        }
    }
}

/// Descriptor of a simulated detection model attached to a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlModelConfig {
    pub id: String,
    pub name: String,
    /// Advertised precision in percent (0-100)
    pub precision: f64,
    pub active: bool,
}

impl MlModelConfig {
    fn new(id: &str, name: &str, precision: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            precision,
            active: true,
        }
    }
}

/// Role of a node in the simulated topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Firewall,
    Router,
    Switch,
    Server,
    Workstation,
    Iot,
    External,
    Attacker,
}

/// Reported state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Online,
    Offline,
    Compromised,
    Scanning,
}

/// One node of the simulated network inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub ip: IpAddr,
    pub status: NodeStatus,
    pub zone: String,
}

impl NetworkNode {
    fn new(id: &str, name: &str, node_type: NodeType, ip: IpAddr, zone: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            node_type,
            ip,
            status: NodeStatus::Online,
            zone: zone.to_string(),
        }
    }
}

/// Static description of a monitorable network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub kind: NetworkKind,
    pub name: String,
    pub risk_level: RiskLevel,
    pub ml_models: Vec<MlModelConfig>,
}

impl NetworkProfile {
    /// Built-in profile catalogue entry for a network kind
    pub fn for_kind(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::Enterprise => Self {
                kind,
                name: "Enterprise Network".to_string(),
                risk_level: RiskLevel::Medium,
                ml_models: vec![MlModelConfig::new(
                    "baseline",
                    "Traffic Baseline Model",
                    91.4,
                )],
            },
            NetworkKind::Tactical => Self {
                kind,
                name: "Tactical Combat Network".to_string(),
                risk_level: RiskLevel::Critical,
                ml_models: vec![
                    MlModelConfig::new("rf_anomaly", "RF Anomaly Detection", 94.5),
                    MlModelConfig::new("jamming_detect", "Jamming Detector", 97.2),
                ],
            },
            NetworkKind::Strategic => Self {
                kind,
                name: "Strategic Command Network".to_string(),
                risk_level: RiskLevel::Critical,
                ml_models: vec![
                    MlModelConfig::new("apt_hunter", "APT Hunter", 96.8),
                    MlModelConfig::new("insider_detect", "Insider Threat Detector", 92.3),
                    MlModelConfig::new("zero_day", "Zero-Day Predictor", 89.1),
                ],
            },
            NetworkKind::Intelligence => Self {
                kind,
                name: "Intelligence & Surveillance Network".to_string(),
                risk_level: RiskLevel::High,
                ml_models: vec![
                    MlModelConfig::new("exfil_watch", "Exfiltration Watcher", 95.4),
                    MlModelConfig::new("sensor_integrity", "Sensor Integrity Monitor", 91.7),
                ],
            },
            NetworkKind::Industrial => Self {
                kind,
                name: "Industrial Control Network".to_string(),
                risk_level: RiskLevel::High,
                ml_models: vec![MlModelConfig::new(
                    "ics_anomaly",
                    "ICS Anomaly Detection",
                    93.6,
                )],
            },
            NetworkKind::Logistics => Self {
                kind,
                name: "Logistics Support Network".to_string(),
                risk_level: RiskLevel::Medium,
                ml_models: vec![MlModelConfig::new(
                    "supply_chain",
                    "Supply Chain Monitor",
                    90.2,
                )],
            },
            NetworkKind::CyberDefense => Self {
                kind,
                name: "Cyber Defense SOC Network".to_string(),
                risk_level: RiskLevel::High,
                ml_models: vec![
                    MlModelConfig::new("threat_hunter", "Threat Hunter", 95.9),
                    MlModelConfig::new("c2_detect", "C2 Beacon Detector", 93.8),
                ],
            },
        }
    }

    /// Protocol mix observed on this kind of network
    pub fn protocols(&self) -> Vec<Protocol> {
        match self.kind {
            NetworkKind::Tactical => vec![
                Protocol::Tcp,
                Protocol::Udp,
                Protocol::Https,
                Protocol::Dns,
                Protocol::Ssh,
            ],
            NetworkKind::Intelligence => vec![
                Protocol::Tcp,
                Protocol::Https,
                Protocol::Ssh,
                Protocol::Ftp,
            ],
            NetworkKind::Industrial | NetworkKind::Logistics => vec![
                Protocol::Tcp,
                Protocol::Udp,
                Protocol::Modbus,
                Protocol::Dnp3,
                Protocol::Http,
            ],
            NetworkKind::CyberDefense => vec![
                Protocol::Tcp,
                Protocol::Udp,
                Protocol::Https,
                Protocol::Dns,
                Protocol::Ssh,
                Protocol::Smtp,
            ],
            _ => vec![
                Protocol::Tcp,
                Protocol::Udp,
                Protocol::Http,
                Protocol::Https,
                Protocol::Dns,
            ],
        }
    }
}

/// Node inventory generated for a network kind
pub fn nodes_for_kind(kind: NetworkKind) -> Vec<NetworkNode> {
    let mut nodes = vec![
        NetworkNode::new("fw1", "Main Firewall", NodeType::Firewall, ip(10, 0, 0, 1), "perimeter"),
        NetworkNode::new("ext1", "Internet", NodeType::External, ip(0, 0, 0, 0), "external"),
    ];

    match kind {
        NetworkKind::Tactical => nodes.extend([
            NetworkNode::new("r1", "Tactical Router", NodeType::Router, ip(10, 1, 0, 1), "tactical"),
            NetworkNode::new("sw1", "Field Switch", NodeType::Switch, ip(10, 1, 1, 1), "tactical"),
            NetworkNode::new("sw2", "Command Switch", NodeType::Switch, ip(10, 1, 2, 1), "command"),
            NetworkNode::new("srv1", "C2 Server", NodeType::Server, ip(10, 1, 2, 10), "command"),
            NetworkNode::new("srv2", "Comms Server", NodeType::Server, ip(10, 1, 2, 11), "command"),
            NetworkNode::new("ws1", "Tactical Terminal 1", NodeType::Workstation, ip(10, 1, 1, 101), "tactical"),
            NetworkNode::new("ws2", "Tactical Terminal 2", NodeType::Workstation, ip(10, 1, 1, 102), "tactical"),
            NetworkNode::new("iot1", "RF Sensor", NodeType::Iot, ip(10, 1, 1, 200), "tactical"),
            NetworkNode::new("iot2", "GPS Sensor", NodeType::Iot, ip(10, 1, 1, 201), "tactical"),
        ]),
        NetworkKind::Strategic => nodes.extend([
            NetworkNode::new("r1", "Core Router A", NodeType::Router, ip(10, 2, 0, 1), "core"),
            NetworkNode::new("r2", "Core Router B", NodeType::Router, ip(10, 2, 0, 2), "core"),
            NetworkNode::new("sw1", "DMZ Switch", NodeType::Switch, ip(10, 2, 1, 1), "dmz"),
            NetworkNode::new("sw2", "Command Switch", NodeType::Switch, ip(10, 2, 2, 1), "command"),
            NetworkNode::new("sw3", "Classified Switch", NodeType::Switch, ip(10, 2, 3, 1), "classified"),
            NetworkNode::new("srv1", "Web Server", NodeType::Server, ip(10, 2, 1, 10), "dmz"),
            NetworkNode::new("srv2", "C4ISR Server", NodeType::Server, ip(10, 2, 2, 10), "command"),
            NetworkNode::new("srv3", "Intel Server", NodeType::Server, ip(10, 2, 3, 10), "classified"),
            NetworkNode::new("srv4", "Database Server", NodeType::Server, ip(10, 2, 3, 11), "classified"),
            NetworkNode::new("ws1", "Command Console", NodeType::Workstation, ip(10, 2, 2, 101), "command"),
        ]),
        NetworkKind::Intelligence => nodes.extend([
            NetworkNode::new("r1", "ISR Router", NodeType::Router, ip(10, 3, 0, 1), "isr"),
            NetworkNode::new("sw1", "Sensor Switch", NodeType::Switch, ip(10, 3, 1, 1), "sensors"),
            NetworkNode::new("sw2", "Processing Switch", NodeType::Switch, ip(10, 3, 2, 1), "processing"),
            NetworkNode::new("sw3", "Analysis Switch", NodeType::Switch, ip(10, 3, 3, 1), "analysis"),
            NetworkNode::new("srv1", "SIGINT Server", NodeType::Server, ip(10, 3, 1, 10), "sensors"),
            NetworkNode::new("srv2", "IMINT Server", NodeType::Server, ip(10, 3, 1, 11), "sensors"),
            NetworkNode::new("srv3", "ML Processor", NodeType::Server, ip(10, 3, 2, 10), "processing"),
            NetworkNode::new("srv4", "Fusion Server", NodeType::Server, ip(10, 3, 3, 10), "analysis"),
            NetworkNode::new("srv5", "Intel Database", NodeType::Server, ip(10, 3, 3, 11), "analysis"),
            NetworkNode::new("iot1", "Radar Sensor", NodeType::Iot, ip(10, 3, 1, 200), "sensors"),
            NetworkNode::new("iot2", "SAR Sensor", NodeType::Iot, ip(10, 3, 1, 201), "sensors"),
        ]),
        NetworkKind::CyberDefense => nodes.extend([
            NetworkNode::new("r1", "SOC Router", NodeType::Router, ip(10, 5, 0, 1), "soc"),
            NetworkNode::new("sw1", "Monitoring Switch", NodeType::Switch, ip(10, 5, 1, 1), "monitoring"),
            NetworkNode::new("sw2", "Analysis Switch", NodeType::Switch, ip(10, 5, 2, 1), "analysis"),
            NetworkNode::new("srv1", "SIEM Server", NodeType::Server, ip(10, 5, 1, 10), "monitoring"),
            NetworkNode::new("srv2", "Threat Intel Server", NodeType::Server, ip(10, 5, 1, 11), "monitoring"),
            NetworkNode::new("srv3", "Malware Sandbox", NodeType::Server, ip(10, 5, 2, 10), "analysis"),
            NetworkNode::new("srv4", "Forensics Server", NodeType::Server, ip(10, 5, 2, 11), "analysis"),
            NetworkNode::new("ws1", "SOC Analyst 1", NodeType::Workstation, ip(10, 5, 1, 101), "monitoring"),
            NetworkNode::new("ws2", "SOC Analyst 2", NodeType::Workstation, ip(10, 5, 1, 102), "monitoring"),
            NetworkNode::new("ws3", "Threat Analyst", NodeType::Workstation, ip(10, 5, 2, 101), "analysis"),
        ]),
        _ => nodes.extend([
            NetworkNode::new("r1", "Main Router", NodeType::Router, ip(10, 0, 1, 1), "core"),
            NetworkNode::new("sw1", "Core Switch", NodeType::Switch, ip(10, 0, 2, 1), "core"),
            NetworkNode::new("srv1", "Server 1", NodeType::Server, ip(10, 0, 2, 10), "servers"),
            NetworkNode::new("srv2", "Server 2", NodeType::Server, ip(10, 0, 2, 11), "servers"),
            NetworkNode::new("ws1", "Workstation 1", NodeType::Workstation, ip(10, 0, 3, 101), "users"),
            NetworkNode::new("ws2", "Workstation 2", NodeType::Workstation, ip(10, 0, 3, 102), "users"),
            NetworkNode::new("ws3", "Workstation 3", NodeType::Workstation, ip(10, 0, 3, 103), "users"),
        ]),
    }

    nodes
}

/// Parameters the flow generator draws from
///
/// Derived from the selected profile and alert level, never persisted.
/// All three IP pools and the protocol list must be non-empty;
/// [`NetworkConfig::flow_config`] guarantees this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowGenerationConfig {
    pub base_ips: Vec<IpAddr>,
    pub external_ips: Vec<IpAddr>,
    pub attacker_ips: Vec<IpAddr>,
    pub protocols: Vec<Protocol>,
    /// Probability a tick takes the attack branch
    pub threat_probability: f64,
    /// Probability a tick takes the critical branch
    pub critical_probability: f64,
}

impl Default for FlowGenerationConfig {
    fn default() -> Self {
        Self {
            base_ips: vec![
                ip(10, 0, 3, 101),
                ip(10, 0, 3, 102),
                ip(10, 0, 2, 10),
                ip(10, 0, 2, 11),
                ip(192, 168, 1, 50),
            ],
            external_ips: vec![
                ip(8, 8, 8, 8),
                ip(1, 1, 1, 1),
                ip(208, 67, 222, 222),
                ip(93, 184, 216, 34),
            ],
            attacker_ips: vec![
                ip(185, 220, 101, 45),
                ip(45, 155, 205, 233),
                ip(194, 26, 29, 113),
            ],
            protocols: vec![
                Protocol::Tcp,
                Protocol::Udp,
                Protocol::Http,
                Protocol::Https,
                Protocol::Dns,
            ],
            threat_probability: 0.10,
            critical_probability: 0.05,
        }
    }
}

/// Result of one discovery-scan tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTick {
    /// Progress after this tick, 0-100
    pub progress: u8,
    pub completed: bool,
}

/// Network configuration state owned by the composition root
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    profile: Option<NetworkProfile>,
    nodes: Vec<NetworkNode>,
    alert_level: AlertLevel,
    is_configured: bool,
    is_active: bool,
    configured_at: Option<DateTime<Utc>>,
    activated_at: Option<DateTime<Utc>>,
    scan_progress: Option<u8>,
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the profile for a network kind and regenerate its inventory
    pub fn select_network(&mut self, kind: NetworkKind) {
        let profile = NetworkProfile::for_kind(kind);
        info!("Selected network profile: {}", profile.name);
        self.nodes = nodes_for_kind(kind);
        self.profile = Some(profile);
    }

    pub fn set_alert_level(&mut self, level: AlertLevel) {
        debug!("Alert level set to {:?}", level);
        self.alert_level = level;
    }

    pub fn complete_configuration(&mut self) {
        self.is_configured = true;
        self.configured_at = Some(Utc::now());
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.activated_at = Some(Utc::now());
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Reset everything back to the unconfigured state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn profile(&self) -> Option<&NetworkProfile> {
        self.profile.as_ref()
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn alert_level(&self) -> AlertLevel {
        self.alert_level
    }

    pub fn is_configured(&self) -> bool {
        self.is_configured
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn configured_at(&self) -> Option<DateTime<Utc>> {
        self.configured_at
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    /// ML models configured on the selected profile
    pub fn ml_models(&self) -> &[MlModelConfig] {
        self.profile.as_ref().map(|p| p.ml_models.as_slice()).unwrap_or(&[])
    }

    /// Update the status of a node; returns false if the id is unknown
    pub fn update_node_status(&mut self, node_id: &str, status: NodeStatus) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    pub fn add_node(&mut self, node: NetworkNode) {
        self.nodes.push(node);
    }

    /// Remove a node; returns false if the id is unknown
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        self.nodes.len() != before
    }

    /// Whether a discovery scan is running
    pub fn is_scanning(&self) -> bool {
        self.scan_progress.is_some()
    }

    pub fn scan_progress(&self) -> Option<u8> {
        self.scan_progress
    }

    /// Start the simulated discovery scan, marking nodes as scanning
    pub fn begin_scan(&mut self) {
        info!("Discovery scan started");
        self.scan_progress = Some(0);
        for node in &mut self.nodes {
            if node.status == NodeStatus::Online {
                node.status = NodeStatus::Scanning;
            }
        }
    }

    /// Advance the scan by `step` percent; completion marks the
    /// configuration done and brings scanned nodes back online.
    pub fn advance_scan(&mut self, step: u8) -> Option<ScanTick> {
        let progress = self.scan_progress?;
        let next = progress.saturating_add(step);

        if next >= 100 {
            self.scan_progress = None;
            for node in &mut self.nodes {
                if node.status == NodeStatus::Scanning {
                    node.status = NodeStatus::Online;
                }
            }
            self.complete_configuration();
            info!("Discovery scan completed");
            Some(ScanTick {
                progress: 100,
                completed: true,
            })
        } else {
            self.scan_progress = Some(next);
            Some(ScanTick {
                progress: next,
                completed: false,
            })
        }
    }

    /// Derive the generator parameters for the current profile and alert level
    pub fn flow_config(&self) -> FlowGenerationConfig {
        let profile = match &self.profile {
            Some(profile) => profile,
            None => return FlowGenerationConfig::default(),
        };

        let base_ips: Vec<IpAddr> = self
            .nodes
            .iter()
            .filter(|n| {
                matches!(
                    n.node_type,
                    NodeType::Server | NodeType::Workstation | NodeType::Iot
                )
            })
            .map(|n| n.ip)
            .collect();

        let (mut threat_probability, mut critical_probability) = self.alert_level.probabilities();
        let factor = profile.risk_level.probability_factor();
        threat_probability = (threat_probability * factor).min(0.40);
        critical_probability = (critical_probability * factor).min(0.20);

        let base_ips = if base_ips.is_empty() {
            FlowGenerationConfig::default().base_ips
        } else {
            base_ips
        };

        FlowGenerationConfig {
            base_ips,
            external_ips: vec![
                ip(8, 8, 8, 8),
                ip(1, 1, 1, 1),
                ip(208, 67, 222, 222),
                ip(93, 184, 216, 34),
                ip(104, 26, 10, 78),
            ],
            attacker_ips: vec![
                ip(185, 220, 101, 45),
                ip(45, 155, 205, 233),
                ip(194, 26, 29, 113),
                ip(91, 121, 87, 18),
                ip(185, 100, 87, 202),
            ],
            protocols: profile.protocols(),
            threat_probability,
            critical_probability,
        }
    }
}
