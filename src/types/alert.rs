//! Threat alerts and response records
//!
//! Alert data model: severity/status enums, the category -> MITRE ATT&CK
//! lookup, indicators of compromise and the operator response sub-records
//! (notes and actions).

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    Info = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl Severity {
    /// Map a 0-100 threat score to a severity bucket
    pub fn from_score(score: u8) -> Severity {
        match score {
            90..=u8::MAX => Severity::Critical,
            70..=89 => Severity::High,
            50..=69 => Severity::Medium,
            30..=49 => Severity::Low,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Workflow state of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    New,
    Investigating,
    Contained,
    Resolved,
    FalsePositive,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::New => write!(f, "new"),
            AlertStatus::Investigating => write!(f, "investigating"),
            AlertStatus::Contained => write!(f, "contained"),
            AlertStatus::Resolved => write!(f, "resolved"),
            AlertStatus::FalsePositive => write!(f, "false_positive"),
        }
    }
}

/// Threat category assigned during classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    Malware,
    Ransomware,
    Phishing,
    Apt,
    Ddos,
    BruteForce,
    DataExfiltration,
    InsiderThreat,
    PortScan,
    PrivilegeEscalation,
    LateralMovement,
    C2Communication,
    #[default]
    Anomaly,
    PolicyViolation,
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatCategory::Malware => write!(f, "malware"),
            ThreatCategory::Ransomware => write!(f, "ransomware"),
            ThreatCategory::Phishing => write!(f, "phishing"),
            ThreatCategory::Apt => write!(f, "apt"),
            ThreatCategory::Ddos => write!(f, "ddos"),
            ThreatCategory::BruteForce => write!(f, "brute_force"),
            ThreatCategory::DataExfiltration => write!(f, "data_exfiltration"),
            ThreatCategory::InsiderThreat => write!(f, "insider_threat"),
            ThreatCategory::PortScan => write!(f, "port_scan"),
            ThreatCategory::PrivilegeEscalation => write!(f, "privilege_escalation"),
            ThreatCategory::LateralMovement => write!(f, "lateral_movement"),
            ThreatCategory::C2Communication => write!(f, "c2_communication"),
            ThreatCategory::Anomaly => write!(f, "anomaly"),
            ThreatCategory::PolicyViolation => write!(f, "policy_violation"),
        }
    }
}

/// MITRE ATT&CK tactics referenced by the category mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitreTactic {
    Reconnaissance,
    InitialAccess,
    Execution,
    Persistence,
    PrivilegeEscalation,
    CredentialAccess,
    DefenseEvasion,
    Discovery,
    LateralMovement,
    Collection,
    CommandAndControl,
    Exfiltration,
    Impact,
}

impl std::fmt::Display for MitreTactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MitreTactic::Reconnaissance => write!(f, "reconnaissance"),
            MitreTactic::InitialAccess => write!(f, "initial_access"),
            MitreTactic::Execution => write!(f, "execution"),
            MitreTactic::Persistence => write!(f, "persistence"),
            MitreTactic::PrivilegeEscalation => write!(f, "privilege_escalation"),
            MitreTactic::CredentialAccess => write!(f, "credential_access"),
            MitreTactic::DefenseEvasion => write!(f, "defense_evasion"),
            MitreTactic::Discovery => write!(f, "discovery"),
            MitreTactic::LateralMovement => write!(f, "lateral_movement"),
            MitreTactic::Collection => write!(f, "collection"),
            MitreTactic::CommandAndControl => write!(f, "command_and_control"),
            MitreTactic::Exfiltration => write!(f, "exfiltration"),
            MitreTactic::Impact => write!(f, "impact"),
        }
    }
}

/// Fixed tactic/technique pair for a threat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MitreMapping {
    pub tactic: MitreTactic,
    pub technique: &'static str,
    pub technique_id: &'static str,
}

/// Types of indicators of compromise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IocType {
    Ip,
    Domain,
    Url,
    HashMd5,
    HashSha256,
    Email,
    FileName,
    Registry,
    Mutex,
}

/// Indicator of compromise
///
/// Deduplicated by `(ioc_type, value)`: a repeat sighting refreshes
/// `last_seen` on the existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ioc {
    pub id: Uuid,
    pub ioc_type: IocType,
    pub value: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub source: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub is_blocked: bool,
}

impl Ioc {
    pub fn new(ioc_type: IocType, value: impl Into<String>, confidence: f64, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ioc_type,
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            source: source.into(),
            first_seen: now,
            last_seen: now,
            is_blocked: false,
        }
    }
}

/// Analyst note appended to an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatNote {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub content: String,
}

impl ThreatNote {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            author: author.into(),
            content: content.into(),
        }
    }
}

/// Response action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    BlockIp,
    IsolateHost,
    KillProcess,
    QuarantineFile,
    ResetPassword,
    DisableAccount,
    Custom,
}

/// Execution state of a response action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Response action executed against an alert
///
/// Created `in_progress`; the engine flips it to `completed` after the
/// simulated execution delay. The `failed` state exists but nothing in the
/// simulation transitions into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action_type: ActionType,
    pub description: String,
    pub status: ActionStatus,
    pub executed_by: String,
    pub result: Option<String>,
}

impl ThreatAction {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action_type,
            description: description.into(),
            status: ActionStatus::InProgress,
            executed_by: "system".to_string(),
            result: None,
        }
    }
}

/// A threat alert raised from a suspicious flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAlert {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub status: AlertStatus,
    pub category: ThreatCategory,

    pub title: String,
    pub description: String,

    pub source_ip: IpAddr,
    pub source_port: Option<u16>,
    pub source_hostname: Option<String>,
    pub source_geo: Option<String>,

    pub destination_ip: IpAddr,
    pub destination_port: Option<u16>,
    pub destination_hostname: Option<String>,

    /// 0-100, copied from the originating flow's threat score
    pub ml_score: u8,
    pub ml_model: String,
    /// 0.0 - 1.0
    pub confidence: f64,

    pub mitre_tactic: MitreTactic,
    pub mitre_technique: String,
    pub mitre_technique_id: String,

    pub iocs: Vec<Ioc>,

    pub assigned_to: Option<String>,
    pub notes: Vec<ThreatNote>,
    pub actions: Vec<ThreatAction>,

    pub flow_id: Option<Uuid>,
    pub is_escalated: bool,
    pub related_alerts: Vec<Uuid>,
}
