//! Threat classification
//!
//! Deterministic derivation of an alert from a suspicious flow: fixed
//! threat-type -> category table, score -> severity thresholds, and the
//! category -> MITRE ATT&CK mapping. Also extracts the source-IP IOC when
//! the origin lies outside the private ranges.

use std::net::IpAddr;

use chrono::Utc;
use uuid::Uuid;

use crate::types::{
    AlertStatus, Ioc, IocType, MitreMapping, MitreTactic, NetworkFlow, Severity, ThreatAlert,
    ThreatCategory, ThreatType,
};

/// Model name reported when the flow carries no ML verdict
const DEFAULT_MODEL: &str = "SENTINEL-ML";

/// Confidence reported when the flow carries no ML verdict
const DEFAULT_CONFIDENCE: f64 = 0.85;

/// IOC confidence for an external source IP sighting
const IOC_CONFIDENCE: f64 = 0.8;

/// IOC source tag for indicators extracted from flows
const IOC_SOURCE: &str = "flow-analysis";

/// Map a flow threat type to its alert category; unknown types fall back
/// to anomaly.
pub fn categorize(threat_type: ThreatType) -> ThreatCategory {
    match threat_type {
        ThreatType::PortScan => ThreatCategory::PortScan,
        ThreatType::Ddos => ThreatCategory::Ddos,
        ThreatType::Exfiltration => ThreatCategory::DataExfiltration,
        ThreatType::Malware => ThreatCategory::Malware,
        ThreatType::BruteForce => ThreatCategory::BruteForce,
        ThreatType::Apt => ThreatCategory::Apt,
        _ => ThreatCategory::Anomaly,
    }
}

/// Fixed MITRE ATT&CK tactic/technique pair for every category
pub fn mitre_mapping(category: ThreatCategory) -> MitreMapping {
    match category {
        ThreatCategory::Malware => MitreMapping {
            tactic: MitreTactic::Execution,
            technique: "User Execution",
            technique_id: "T1204",
        },
        ThreatCategory::Ransomware => MitreMapping {
            tactic: MitreTactic::Impact,
            technique: "Data Encrypted for Impact",
            technique_id: "T1486",
        },
        ThreatCategory::Phishing => MitreMapping {
            tactic: MitreTactic::InitialAccess,
            technique: "Phishing",
            technique_id: "T1566",
        },
        ThreatCategory::Apt => MitreMapping {
            tactic: MitreTactic::Persistence,
            technique: "Create Account",
            technique_id: "T1136",
        },
        ThreatCategory::Ddos => MitreMapping {
            tactic: MitreTactic::Impact,
            technique: "Network Denial of Service",
            technique_id: "T1498",
        },
        ThreatCategory::BruteForce => MitreMapping {
            tactic: MitreTactic::CredentialAccess,
            technique: "Brute Force",
            technique_id: "T1110",
        },
        ThreatCategory::DataExfiltration => MitreMapping {
            tactic: MitreTactic::Exfiltration,
            technique: "Exfiltration Over C2 Channel",
            technique_id: "T1041",
        },
        ThreatCategory::InsiderThreat => MitreMapping {
            tactic: MitreTactic::Collection,
            technique: "Data from Local System",
            technique_id: "T1005",
        },
        ThreatCategory::PortScan => MitreMapping {
            tactic: MitreTactic::Reconnaissance,
            technique: "Active Scanning",
            technique_id: "T1595",
        },
        ThreatCategory::PrivilegeEscalation => MitreMapping {
            tactic: MitreTactic::PrivilegeEscalation,
            technique: "Exploitation for Privilege Escalation",
            technique_id: "T1068",
        },
        ThreatCategory::LateralMovement => MitreMapping {
            tactic: MitreTactic::LateralMovement,
            technique: "Remote Services",
            technique_id: "T1021",
        },
        ThreatCategory::C2Communication => MitreMapping {
            tactic: MitreTactic::CommandAndControl,
            technique: "Application Layer Protocol",
            technique_id: "T1071",
        },
        ThreatCategory::Anomaly => MitreMapping {
            tactic: MitreTactic::Discovery,
            technique: "System Information Discovery",
            technique_id: "T1082",
        },
        ThreatCategory::PolicyViolation => MitreMapping {
            tactic: MitreTactic::DefenseEvasion,
            technique: "Indicator Removal",
            technique_id: "T1070",
        },
    }
}

fn alert_title(category: ThreatCategory, source_ip: IpAddr) -> String {
    match category {
        ThreatCategory::Malware => format!("Malware detected from {source_ip}"),
        ThreatCategory::Ransomware => format!("Ransomware activity from {source_ip}"),
        ThreatCategory::Phishing => format!("Phishing attempt from {source_ip}"),
        ThreatCategory::Apt => format!("APT behavior detected - {source_ip}"),
        ThreatCategory::Ddos => format!("DDoS attack from {source_ip}"),
        ThreatCategory::BruteForce => format!("Brute force attack from {source_ip}"),
        ThreatCategory::DataExfiltration => format!("Possible data exfiltration to {source_ip}"),
        ThreatCategory::InsiderThreat => format!("Insider threat detected - {source_ip}"),
        ThreatCategory::PortScan => format!("Port scan from {source_ip}"),
        ThreatCategory::PrivilegeEscalation => format!("Privilege escalation - {source_ip}"),
        ThreatCategory::LateralMovement => format!("Lateral movement detected - {source_ip}"),
        ThreatCategory::C2Communication => format!("Suspicious C2 communication - {source_ip}"),
        ThreatCategory::Anomaly => format!("Traffic anomaly from {source_ip}"),
        ThreatCategory::PolicyViolation => format!("Policy violation - {source_ip}"),
    }
}

fn alert_description(category: ThreatCategory, flow: &NetworkFlow) -> String {
    format!(
        "Suspicious \"{}\" activity detected from {}:{} to {}:{} over {}. \
         ML threat score: {}%. Immediate investigation required.",
        category,
        flow.src_ip,
        flow.src_port,
        flow.dst_ip,
        flow.dst_port,
        flow.protocol,
        flow.threat_score,
    )
}

/// Private ranges that never produce an IP indicator
fn is_private_source(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            octets[0] == 10 || (octets[0] == 192 && octets[1] == 168)
        }
        IpAddr::V6(_) => false,
    }
}

/// Extract indicators of compromise from a flow.
///
/// A source IP outside 10.0.0.0/8 and 192.168.0.0/16 yields one `ip`
/// indicator with fixed confidence.
pub fn extract_iocs(flow: &NetworkFlow) -> Vec<Ioc> {
    if is_private_source(flow.src_ip) {
        Vec::new()
    } else {
        vec![Ioc::new(
            IocType::Ip,
            flow.src_ip.to_string(),
            IOC_CONFIDENCE,
            IOC_SOURCE,
        )]
    }
}

/// Build the alert a qualifying flow raises.
///
/// Pure function of the flow: category, severity and the MITRE triple are
/// all fixed lookups; the geo field is carried over from the flow.
pub fn build_alert(flow: &NetworkFlow) -> ThreatAlert {
    let category = categorize(flow.threat_type);
    let severity = Severity::from_score(flow.threat_score);
    let mitre = mitre_mapping(category);

    ThreatAlert {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        severity,
        status: AlertStatus::New,
        category,
        title: alert_title(category, flow.src_ip),
        description: alert_description(category, flow),
        source_ip: flow.src_ip,
        source_port: Some(flow.src_port),
        source_hostname: None,
        source_geo: flow.geo_source.clone(),
        destination_ip: flow.dst_ip,
        destination_port: Some(flow.dst_port),
        destination_hostname: None,
        ml_score: flow.threat_score,
        ml_model: flow
            .ml_prediction
            .as_ref()
            .map(|p| p.model_used.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        confidence: flow
            .ml_prediction
            .as_ref()
            .map(|p| p.confidence)
            .unwrap_or(DEFAULT_CONFIDENCE),
        mitre_tactic: mitre.tactic,
        mitre_technique: mitre.technique.to_string(),
        mitre_technique_id: mitre.technique_id.to_string(),
        iocs: extract_iocs(flow),
        assigned_to: None,
        notes: Vec::new(),
        actions: Vec::new(),
        flow_id: Some(flow.id),
        is_escalated: false,
        related_alerts: Vec::new(),
    }
}
