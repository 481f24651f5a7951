//! In-memory alert and IOC store
//!
//! Alerts are prepended on creation and never deleted individually, only
//! bulk-cleared. Every by-id mutator is a total function: a missing id
//! changes nothing and returns false.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::detection::classifier;
use crate::types::{
    ActionStatus, ActionType, AlertStatus, CategoryCount, Ioc, MitreTactic, NetworkFlow, Severity,
    SourceIpCount, TacticCount, ThreatAction, ThreatAlert, ThreatCategory, ThreatNote,
    ThreatStatistics,
};

/// Default author for operator notes
const DEFAULT_NOTE_AUTHOR: &str = "analyst";

/// Result string stamped on a completed action
const ACTION_SUCCESS_RESULT: &str = "Action executed successfully";

/// Alert and IOC state
#[derive(Debug, Default)]
pub struct AlertStore {
    alerts: Vec<ThreatAlert>,
    iocs: Vec<Ioc>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Alert creation
    // ------------------------------------------------------------------

    /// Prepend an alert and register its attached IOCs
    pub fn add_alert(&mut self, alert: ThreatAlert) -> Uuid {
        info!(
            "Alert raised: {} (severity {}, category {})",
            alert.title, alert.severity, alert.category
        );

        for ioc in &alert.iocs {
            self.upsert_ioc(ioc.clone());
        }

        let id = alert.id;
        self.alerts.insert(0, alert);
        id
    }

    /// Classify a qualifying flow and store the resulting alert
    pub fn create_alert_from_flow(&mut self, flow: &NetworkFlow) -> ThreatAlert {
        let alert = classifier::build_alert(flow);
        self.add_alert(alert.clone());
        alert
    }

    // ------------------------------------------------------------------
    // Alert mutators (total; missing ids return false)
    // ------------------------------------------------------------------

    /// Change an alert's workflow status
    pub fn update_status(&mut self, alert_id: Uuid, status: AlertStatus) -> bool {
        match self.alert_mut(alert_id) {
            Some(alert) => {
                debug!("Alert {} status -> {}", alert_id, status);
                alert.status = status;
                true
            }
            None => false,
        }
    }

    /// Append an analyst note
    pub fn add_note(
        &mut self,
        alert_id: Uuid,
        author: Option<&str>,
        content: impl Into<String>,
    ) -> bool {
        match self.alert_mut(alert_id) {
            Some(alert) => {
                alert
                    .notes
                    .push(ThreatNote::new(author.unwrap_or(DEFAULT_NOTE_AUTHOR), content));
                true
            }
            None => false,
        }
    }

    /// Start a response action against an alert.
    ///
    /// The action is recorded `in_progress`; the engine completes it after
    /// the simulated delay via [`complete_action`](Self::complete_action).
    /// Returns the action id, or `None` for an unknown alert.
    pub fn execute_action(
        &mut self,
        alert_id: Uuid,
        action_type: ActionType,
        description: impl Into<String>,
    ) -> Option<Uuid> {
        let alert = self.alert_mut(alert_id)?;
        let action = ThreatAction::new(action_type, description);
        let action_id = action.id;
        debug!("Action {:?} started on alert {}", action_type, alert_id);
        alert.actions.push(action);
        Some(action_id)
    }

    /// Flip an in-progress action to completed with a success result
    pub fn complete_action(&mut self, alert_id: Uuid, action_id: Uuid) -> bool {
        let Some(alert) = self.alert_mut(alert_id) else {
            return false;
        };
        match alert.actions.iter_mut().find(|a| a.id == action_id) {
            Some(action) => {
                action.status = ActionStatus::Completed;
                action.result = Some(ACTION_SUCCESS_RESULT.to_string());
                true
            }
            None => false,
        }
    }

    /// Escalate an alert: severity forced to critical, escalation flagged
    pub fn escalate(&mut self, alert_id: Uuid) -> bool {
        match self.alert_mut(alert_id) {
            Some(alert) => {
                info!("Alert {} escalated", alert_id);
                alert.is_escalated = true;
                alert.severity = Severity::Critical;
                true
            }
            None => false,
        }
    }

    /// Union related alert ids into an alert, preserving insertion order
    pub fn relate(&mut self, alert_id: Uuid, related: &[Uuid]) -> bool {
        match self.alert_mut(alert_id) {
            Some(alert) => {
                for id in related {
                    if !alert.related_alerts.contains(id) {
                        alert.related_alerts.push(*id);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Drop every alert; the IOC list is untouched
    pub fn clear_alerts(&mut self) {
        info!("Cleared {} alerts", self.alerts.len());
        self.alerts.clear();
    }

    // ------------------------------------------------------------------
    // IOC management
    // ------------------------------------------------------------------

    /// Insert an IOC, deduplicating by (type, value).
    ///
    /// A repeat sighting refreshes `last_seen` on the stored record and
    /// returns its original id; `first_seen` and `id` never change.
    pub fn upsert_ioc(&mut self, ioc: Ioc) -> Uuid {
        if let Some(existing) = self
            .iocs
            .iter_mut()
            .find(|i| i.ioc_type == ioc.ioc_type && i.value == ioc.value)
        {
            existing.last_seen = Utc::now();
            return existing.id;
        }

        debug!("New IOC recorded: {:?} {}", ioc.ioc_type, ioc.value);
        let id = ioc.id;
        self.iocs.push(ioc);
        id
    }

    /// Mark an IOC blocked; returns false for an unknown id
    pub fn block_ioc(&mut self, ioc_id: Uuid) -> bool {
        self.set_ioc_blocked(ioc_id, true)
    }

    /// Clear an IOC's blocked flag; returns false for an unknown id
    pub fn unblock_ioc(&mut self, ioc_id: Uuid) -> bool {
        self.set_ioc_blocked(ioc_id, false)
    }

    fn set_ioc_blocked(&mut self, ioc_id: Uuid, blocked: bool) -> bool {
        match self.iocs.iter_mut().find(|i| i.id == ioc_id) {
            Some(ioc) => {
                ioc.is_blocked = blocked;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn alerts(&self) -> &[ThreatAlert] {
        &self.alerts
    }

    pub fn iocs(&self) -> &[Ioc] {
        &self.iocs
    }

    pub fn get(&self, alert_id: Uuid) -> Option<&ThreatAlert> {
        self.alerts.iter().find(|a| a.id == alert_id)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// New critical alerts awaiting triage
    pub fn critical_alerts(&self) -> Vec<&ThreatAlert> {
        self.alerts
            .iter()
            .filter(|a| a.severity == Severity::Critical && a.status == AlertStatus::New)
            .collect()
    }

    /// Alerts still being worked (new or investigating)
    pub fn active_alerts(&self) -> Vec<&ThreatAlert> {
        self.alerts
            .iter()
            .filter(|a| matches!(a.status, AlertStatus::New | AlertStatus::Investigating))
            .collect()
    }

    /// IOCs currently blocked
    pub fn blocked_iocs(&self) -> Vec<&Ioc> {
        self.iocs.iter().filter(|i| i.is_blocked).collect()
    }

    fn alert_mut(&mut self, alert_id: Uuid) -> Option<&mut ThreatAlert> {
        self.alerts.iter_mut().find(|a| a.id == alert_id)
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Alert rollup; a pure function of the current alert list
    pub fn statistics(&self) -> ThreatStatistics {
        let mut stats = ThreatStatistics {
            total_alerts: self.alerts.len(),
            ..ThreatStatistics::default()
        };

        let mut categories: HashMap<ThreatCategory, usize> = HashMap::new();
        let mut source_ips: HashMap<IpAddr, usize> = HashMap::new();
        let mut tactics: HashMap<MitreTactic, usize> = HashMap::new();

        for alert in &self.alerts {
            match alert.status {
                AlertStatus::New => stats.new_alerts += 1,
                AlertStatus::Investigating => stats.investigating_alerts += 1,
                AlertStatus::Contained => stats.contained_alerts += 1,
                AlertStatus::Resolved => stats.resolved_alerts += 1,
                AlertStatus::FalsePositive => stats.false_positives += 1,
            }

            match alert.severity {
                Severity::Critical => stats.critical_count += 1,
                Severity::High => stats.high_count += 1,
                Severity::Medium => stats.medium_count += 1,
                Severity::Low => stats.low_count += 1,
                Severity::Info => stats.info_count += 1,
            }

            *categories.entry(alert.category).or_default() += 1;
            *source_ips.entry(alert.source_ip).or_default() += 1;
            *tactics.entry(alert.mitre_tactic).or_default() += 1;
        }

        stats.top_categories = top_counts(categories)
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        stats.top_source_ips = top_counts(source_ips)
            .map(|(ip, count)| SourceIpCount { ip, count })
            .collect();
        stats.top_mitre_tactics = top_counts(tactics)
            .map(|(tactic, count)| TacticCount { tactic, count })
            .collect();

        stats
    }
}

/// Top 5 entries by count, descending, with a stable tie-break on the key
fn top_counts<K: Ord + Copy>(counts: HashMap<K, usize>) -> impl Iterator<Item = (K, usize)> {
    let mut entries: Vec<(K, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries.into_iter().take(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, FlowStatus, IocType, Protocol, ThreatType};
    use std::net::Ipv4Addr;

    fn suspicious_flow(score: u8) -> NetworkFlow {
        NetworkFlow {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            src_ip: IpAddr::V4(Ipv4Addr::new(185, 220, 101, 45)),
            src_port: 40123,
            dst_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 2, 10)),
            dst_port: 22,
            protocol: Protocol::Ssh,
            direction: Direction::Inbound,
            bytes_in: 900,
            bytes_out: 400,
            packets_in: 9,
            packets_out: 4,
            duration_ms: 250,
            status: FlowStatus::Critical,
            threat_type: ThreatType::BruteForce,
            threat_score: score,
            geo_source: Some("Russia".to_string()),
            geo_destination: Some("Colombia".to_string()),
            application_layer: None,
            ml_prediction: None,
        }
    }

    #[test]
    fn test_alerts_prepend() {
        let mut store = AlertStore::new();
        let first = store.create_alert_from_flow(&suspicious_flow(80));
        let second = store.create_alert_from_flow(&suspicious_flow(60));

        assert_eq!(store.len(), 2);
        assert_eq!(store.alerts()[0].id, second.id);
        assert_eq!(store.alerts()[1].id, first.id);
    }

    #[test]
    fn test_ioc_dedup_on_repeat_sighting() {
        let mut store = AlertStore::new();
        store.create_alert_from_flow(&suspicious_flow(80));
        let first = store.iocs()[0].clone();

        store.create_alert_from_flow(&suspicious_flow(90));

        assert_eq!(store.iocs().len(), 1);
        let stored = &store.iocs()[0];
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.first_seen, first.first_seen);
        assert!(stored.last_seen >= first.last_seen);
    }

    #[test]
    fn test_manual_ioc_dedup_by_type_and_value() {
        let mut store = AlertStore::new();
        let a = store.upsert_ioc(Ioc::new(IocType::Domain, "evil.example", 0.9, "feed"));
        let b = store.upsert_ioc(Ioc::new(IocType::Domain, "evil.example", 0.5, "feed"));
        let c = store.upsert_ioc(Ioc::new(IocType::Url, "evil.example", 0.9, "feed"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.iocs().len(), 2);
    }

    #[test]
    fn test_update_status_missing_id_is_noop() {
        let mut store = AlertStore::new();
        let alert = store.create_alert_from_flow(&suspicious_flow(70));

        assert!(store.update_status(alert.id, AlertStatus::Investigating));
        assert!(!store.update_status(Uuid::new_v4(), AlertStatus::Resolved));
        assert_eq!(store.get(alert.id).map(|a| a.status), Some(AlertStatus::Investigating));
    }

    #[test]
    fn test_escalate_forces_critical() {
        let mut store = AlertStore::new();
        let alert = store.create_alert_from_flow(&suspicious_flow(55));
        assert_eq!(store.get(alert.id).map(|a| a.severity), Some(Severity::Medium));

        assert!(store.escalate(alert.id));
        let escalated = store.get(alert.id).expect("alert exists");
        assert_eq!(escalated.severity, Severity::Critical);
        assert!(escalated.is_escalated);

        // Escalation is idempotent
        assert!(store.escalate(alert.id));
        assert_eq!(store.get(alert.id).map(|a| a.severity), Some(Severity::Critical));
    }

    #[test]
    fn test_relate_unions_without_duplicates() {
        let mut store = AlertStore::new();
        let alert = store.create_alert_from_flow(&suspicious_flow(75));
        let other_a = Uuid::new_v4();
        let other_b = Uuid::new_v4();

        assert!(store.relate(alert.id, &[other_a, other_b]));
        assert!(store.relate(alert.id, &[other_b, other_a]));

        let related = &store.get(alert.id).expect("alert exists").related_alerts;
        assert_eq!(related, &vec![other_a, other_b]);
    }

    #[test]
    fn test_action_lifecycle() {
        let mut store = AlertStore::new();
        let alert = store.create_alert_from_flow(&suspicious_flow(85));

        let action_id = store
            .execute_action(alert.id, ActionType::BlockIp, "Block attacker IP")
            .expect("alert exists");

        let action = &store.get(alert.id).expect("alert exists").actions[0];
        assert_eq!(action.status, ActionStatus::InProgress);
        assert!(action.result.is_none());

        assert!(store.complete_action(alert.id, action_id));
        let action = &store.get(alert.id).expect("alert exists").actions[0];
        assert_eq!(action.status, ActionStatus::Completed);
        assert_eq!(action.result.as_deref(), Some(ACTION_SUCCESS_RESULT));

        assert!(store.execute_action(Uuid::new_v4(), ActionType::Custom, "x").is_none());
        assert!(!store.complete_action(alert.id, Uuid::new_v4()));
    }

    #[test]
    fn test_notes_append() {
        let mut store = AlertStore::new();
        let alert = store.create_alert_from_flow(&suspicious_flow(65));

        assert!(store.add_note(alert.id, None, "checking source"));
        assert!(store.add_note(alert.id, Some("tier2"), "confirmed brute force"));

        let notes = &store.get(alert.id).expect("alert exists").notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].author, "analyst");
        assert_eq!(notes[1].author, "tier2");
    }

    #[test]
    fn test_block_and_unblock_ioc() {
        let mut store = AlertStore::new();
        let id = store.upsert_ioc(Ioc::new(IocType::Ip, "203.0.113.9", 0.8, "feed"));

        assert!(store.block_ioc(id));
        assert_eq!(store.blocked_iocs().len(), 1);
        assert!(store.unblock_ioc(id));
        assert!(store.blocked_iocs().is_empty());
        assert!(!store.block_ioc(Uuid::new_v4()));
    }

    #[test]
    fn test_clear_alerts_keeps_iocs() {
        let mut store = AlertStore::new();
        store.create_alert_from_flow(&suspicious_flow(80));
        assert!(!store.iocs().is_empty());

        store.clear_alerts();
        assert!(store.is_empty());
        assert!(!store.iocs().is_empty());
    }

    #[test]
    fn test_statistics_rollup() {
        let mut store = AlertStore::new();
        let a = store.create_alert_from_flow(&suspicious_flow(92)); // critical
        let b = store.create_alert_from_flow(&suspicious_flow(75)); // high
        store.create_alert_from_flow(&suspicious_flow(55)); // medium

        store.update_status(a.id, AlertStatus::Investigating);
        store.update_status(b.id, AlertStatus::Resolved);

        let stats = store.statistics();
        assert_eq!(stats.total_alerts, 3);
        assert_eq!(stats.new_alerts, 1);
        assert_eq!(stats.investigating_alerts, 1);
        assert_eq!(stats.resolved_alerts, 1);
        assert_eq!(stats.critical_count, 1);
        assert_eq!(stats.high_count, 1);
        assert_eq!(stats.medium_count, 1);

        assert_eq!(stats.top_categories[0].category, ThreatCategory::BruteForce);
        assert_eq!(stats.top_categories[0].count, 3);
        assert_eq!(stats.top_source_ips[0].count, 3);
        assert_eq!(stats.top_mitre_tactics[0].tactic, MitreTactic::CredentialAccess);
    }

    #[test]
    fn test_statistics_idempotent() {
        let mut store = AlertStore::new();
        for score in [55, 72, 95] {
            store.create_alert_from_flow(&suspicious_flow(score));
        }
        assert_eq!(store.statistics(), store.statistics());
    }

    #[test]
    fn test_active_and_critical_queries() {
        let mut store = AlertStore::new();
        let a = store.create_alert_from_flow(&suspicious_flow(95));
        let b = store.create_alert_from_flow(&suspicious_flow(60));
        store.update_status(b.id, AlertStatus::Contained);

        assert_eq!(store.critical_alerts().len(), 1);
        assert_eq!(store.critical_alerts()[0].id, a.id);
        assert_eq!(store.active_alerts().len(), 1);
    }
}
