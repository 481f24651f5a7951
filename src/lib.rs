//! sentinel-soc: simulated SOC flow/alert pipeline
//!
//! Fabricates synthetic network flows, classifies them into threat alerts
//! with threshold rules and keeps everything in bounded in-memory stores.
//! There is no packet capture and no real inference; the crate reproduces
//! the observable contract of a security-monitoring product's data plane
//! for demos, dashboards and drills.
//!
//! ## Pipeline
//!
//! ```text
//! tick ─> FlowGenerator ─> FlowStore (cap 200, newest first)
//!              │
//!              └─ score >= threshold ─> classifier ─> AlertStore ─> IOC dedup
//!
//! stats tick ─> compute_statistics(flow list)
//! ```
//!
//! [`SentinelSoc`] is the state container owned by the composition root;
//! [`engine::Monitor`] drives it on tokio timers and publishes change events
//! on a broadcast channel.

pub mod config;
pub mod detection;
pub mod engine;
pub mod network;
pub mod simulator;
pub mod types;

use chrono::Utc;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use config::SimulatorConfig;
use detection::AlertStore;
use network::{AlertLevel, NetworkConfig, NetworkKind, ScanTick};
use simulator::{compute_statistics, FlowGenerator, FlowStore};
use types::{ActionType, AlertStatus, FlowStatistics, NetworkFlow, ThreatAlert};

/// Core simulation state
///
/// Owns the generator, both stores and the network configuration. All
/// operations are synchronous and total; the timer-driven side lives in
/// [`engine::Monitor`].
pub struct SentinelSoc {
    config: SimulatorConfig,
    network: NetworkConfig,
    generator: FlowGenerator,
    flows: FlowStore,
    alerts: AlertStore,
    statistics: FlowStatistics,
}

impl SentinelSoc {
    /// Create an instance from a simulator configuration
    pub fn new(config: SimulatorConfig) -> Self {
        info!(
            "Initializing simulation core (tick {}ms, flow cap {})",
            config.tick_interval_ms, config.flow_capacity
        );

        Self {
            generator: FlowGenerator::new(config.seed),
            flows: FlowStore::new(config.flow_capacity),
            alerts: AlertStore::new(),
            network: NetworkConfig::new(),
            statistics: FlowStatistics::default(),
            config,
        }
    }

    /// Create an instance with a pre-built network configuration
    pub fn with_network(config: SimulatorConfig, network: NetworkConfig) -> Self {
        let mut soc = Self::new(config);
        soc.network = network;
        soc
    }

    // ------------------------------------------------------------------
    // Simulation ticks
    // ------------------------------------------------------------------

    /// One generation tick: fabricate a flow, store it and raise an alert
    /// when the threat score crosses the configured threshold.
    pub fn tick(&mut self) -> (NetworkFlow, Option<ThreatAlert>) {
        let flow_config = self.network.flow_config();
        let flow = self
            .generator
            .generate(&flow_config, self.network.ml_models());

        self.flows.push(flow.clone());

        let alert = if flow.threat_score >= self.config.alert_score_threshold {
            Some(self.alerts.create_alert_from_flow(&flow))
        } else {
            None
        };

        (flow, alert)
    }

    /// Recompute the rolling flow counters from the current list
    pub fn refresh_statistics(&mut self) -> FlowStatistics {
        self.statistics = compute_statistics(self.flows.iter(), Utc::now());
        self.statistics
    }

    /// Advance the discovery scan, if one is running
    pub fn scan_tick(&mut self) -> Option<ScanTick> {
        if !self.network.is_scanning() {
            return None;
        }
        let step = self.generator.rng_mut().random_range(5..20);
        self.network.advance_scan(step)
    }

    // ------------------------------------------------------------------
    // Network configuration
    // ------------------------------------------------------------------

    pub fn select_network(&mut self, kind: NetworkKind) {
        self.network.select_network(kind);
    }

    pub fn set_alert_level(&mut self, level: AlertLevel) {
        self.network.set_alert_level(level);
    }

    pub fn begin_network_scan(&mut self) {
        self.network.begin_scan();
    }

    // ------------------------------------------------------------------
    // Operator mutators (total; missing ids return false)
    // ------------------------------------------------------------------

    /// Rewrite a flow's status to blocked
    pub fn block_flow(&mut self, flow_id: Uuid) -> bool {
        self.flows.block(flow_id)
    }

    pub fn clear_flows(&mut self) {
        self.flows.clear();
    }

    pub fn update_alert_status(&mut self, alert_id: Uuid, status: AlertStatus) -> bool {
        self.alerts.update_status(alert_id, status)
    }

    pub fn add_alert_note(
        &mut self,
        alert_id: Uuid,
        author: Option<&str>,
        content: &str,
    ) -> bool {
        self.alerts.add_note(alert_id, author, content)
    }

    /// Start a response action; completion is driven by the engine timer
    pub fn execute_action(
        &mut self,
        alert_id: Uuid,
        action_type: ActionType,
        description: impl Into<String>,
    ) -> Option<Uuid> {
        self.alerts.execute_action(alert_id, action_type, description)
    }

    pub fn complete_action(&mut self, alert_id: Uuid, action_id: Uuid) -> bool {
        self.alerts.complete_action(alert_id, action_id)
    }

    pub fn escalate_alert(&mut self, alert_id: Uuid) -> bool {
        self.alerts.escalate(alert_id)
    }

    pub fn relate_alerts(&mut self, alert_id: Uuid, related: &[Uuid]) -> bool {
        self.alerts.relate(alert_id, related)
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear_alerts();
    }

    pub fn block_ioc(&mut self, ioc_id: Uuid) -> bool {
        self.alerts.block_ioc(ioc_id)
    }

    pub fn unblock_ioc(&mut self, ioc_id: Uuid) -> bool {
        self.alerts.unblock_ioc(ioc_id)
    }

    // ------------------------------------------------------------------
    // Snapshot reads
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NetworkConfig {
        &mut self.network
    }

    pub fn flows(&self) -> &FlowStore {
        &self.flows
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    /// Last computed rolling counters
    pub fn statistics(&self) -> FlowStatistics {
        self.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn seeded(seed: u64) -> SentinelSoc {
        SentinelSoc::new(SimulatorConfig {
            seed: Some(seed),
            ..SimulatorConfig::default()
        })
    }

    #[test]
    fn test_tick_stores_flow() {
        let mut soc = seeded(1);
        let (flow, _) = soc.tick();
        assert_eq!(soc.flows().len(), 1);
        assert_eq!(soc.flows().iter().next().map(|f| f.id), Some(flow.id));
    }

    #[test]
    fn test_alert_threshold() {
        let mut soc = seeded(2);
        soc.select_network(NetworkKind::Tactical);
        soc.set_alert_level(AlertLevel::Critical);

        for _ in 0..500 {
            let (flow, alert) = soc.tick();
            if flow.threat_score >= 50 {
                let alert = alert.expect("score >= 50 raises an alert");
                assert_eq!(alert.ml_score, flow.threat_score);
                assert_eq!(alert.flow_id, Some(flow.id));
                assert!(alert.severity >= Severity::Medium);
            } else {
                assert!(alert.is_none());
            }
        }
        assert!(!soc.alerts().is_empty());
    }

    #[test]
    fn test_flow_store_respects_capacity() {
        let mut soc = SentinelSoc::new(SimulatorConfig {
            flow_capacity: 25,
            seed: Some(3),
            ..SimulatorConfig::default()
        });
        for _ in 0..100 {
            soc.tick();
        }
        assert_eq!(soc.flows().len(), 25);
    }

    #[test]
    fn test_refresh_statistics_updates_snapshot() {
        let mut soc = seeded(4);
        for _ in 0..10 {
            soc.tick();
        }
        assert_eq!(soc.statistics(), FlowStatistics::default());

        let stats = soc.refresh_statistics();
        assert_eq!(stats.total_flows, 10);
        assert_eq!(soc.statistics(), stats);
    }

    #[test]
    fn test_operator_mutators_delegate() {
        let mut soc = seeded(5);
        let (flow, _) = soc.tick();

        assert!(soc.block_flow(flow.id));
        assert!(!soc.block_flow(Uuid::new_v4()));
        assert!(!soc.escalate_alert(Uuid::new_v4()));

        soc.clear_flows();
        assert!(soc.flows().is_empty());
    }
}
