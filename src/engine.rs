//! Timer-driven monitoring engine
//!
//! Drives the simulation on tokio intervals: a generation tick, a statistics
//! tick and the discovery-scan tick. All state transitions happen behind one
//! `RwLock`, so ticks never observe each other mid-mutation. Consumers read
//! snapshots through the shared state handle and receive change
//! notifications on a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::ActionType;
use crate::SentinelSoc;

/// Capacity of the broadcast event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Event published to monitor subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEvent {
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl MonitorEvent {
    fn new(event_type: &str, data: impl Serialize) -> Self {
        Self {
            event_type: event_type.to_string(),
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
            timestamp: Utc::now(),
        }
    }
}

/// Handle for stopping a running monitor from another task
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl MonitorHandle {
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Timer-driven simulation runner
///
/// Owns the shared state and the event channel. `run` blocks until a
/// shutdown signal arrives; reconfiguring an interval requires stopping and
/// starting a fresh run.
pub struct Monitor {
    state: Arc<RwLock<SentinelSoc>>,
    event_tx: broadcast::Sender<MonitorEvent>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl Monitor {
    pub fn new(soc: SentinelSoc) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            state: Arc::new(RwLock::new(soc)),
            event_tx,
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
        }
    }

    /// Shared handle to the simulation state
    pub fn state(&self) -> Arc<RwLock<SentinelSoc>> {
        self.state.clone()
    }

    /// Subscribe to monitor events. Lagging receivers drop events; nothing
    /// in the engine ever waits for a subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Handle for stopping the monitor from another task
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            shutdown_tx: self.shutdown_tx.clone(),
        }
    }

    /// Signal the running monitor to stop
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    /// Drive the simulation until shutdown
    pub async fn run(&mut self) -> Result<()> {
        let mut shutdown_rx = self
            .shutdown_rx
            .take()
            .context("monitor is already running")?;

        let (tick_ms, stats_ms, scan_ms) = {
            let state = self.state.read().await;
            let config = state.config();
            (
                config.tick_interval_ms.max(1),
                config.stats_interval_ms.max(1),
                config.scan_interval_ms.max(1),
            )
        };

        let mut sim_interval = tokio::time::interval(Duration::from_millis(tick_ms));
        let mut stats_interval = tokio::time::interval(Duration::from_millis(stats_ms));
        let mut scan_interval = tokio::time::interval(Duration::from_millis(scan_ms));

        info!("Monitor started (tick {}ms, stats {}ms)", tick_ms, stats_ms);

        loop {
            tokio::select! {
                _ = sim_interval.tick() => {
                    let (flow, alert) = {
                        let mut state = self.state.write().await;
                        state.tick()
                    };
                    debug!("Generated flow {} ({})", flow.id, flow.status);
                    self.emit("flow_generated", &flow);
                    if let Some(alert) = alert {
                        self.emit("alert_raised", &alert);
                    }
                }

                _ = stats_interval.tick() => {
                    let stats = {
                        let mut state = self.state.write().await;
                        state.refresh_statistics()
                    };
                    self.emit("statistics_updated", &stats);
                }

                _ = scan_interval.tick() => {
                    let scan = {
                        let mut state = self.state.write().await;
                        state.scan_tick()
                    };
                    if let Some(scan) = scan {
                        let event_type = if scan.completed { "scan_completed" } else { "scan_progress" };
                        self.emit(event_type, &scan);
                    }
                }

                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        // Allow a later run after a clean stop
        self.shutdown_rx = Some(shutdown_rx);
        info!("Monitor stopped");
        Ok(())
    }

    /// Start a response action and schedule its simulated completion.
    ///
    /// Returns the action id, or `None` when the alert is unknown. The
    /// action flips to completed after the configured delay and an
    /// `action_completed` event is published.
    pub async fn execute_action(
        &self,
        alert_id: Uuid,
        action_type: ActionType,
        description: &str,
    ) -> Option<Uuid> {
        let (action_id, delay_ms) = {
            let mut state = self.state.write().await;
            let delay_ms = state.config().action_delay_ms;
            let action_id = state.execute_action(alert_id, action_type, description)?;
            (action_id, delay_ms)
        };

        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            let completed = {
                let mut state = state.write().await;
                state.complete_action(alert_id, action_id)
            };
            if completed {
                let _ = event_tx.send(MonitorEvent::new(
                    "action_completed",
                    serde_json::json!({
                        "alert_id": alert_id,
                        "action_id": action_id,
                    }),
                ));
            }
        });

        Some(action_id)
    }

    fn emit(&self, event_type: &str, data: impl Serialize) {
        let _ = self.event_tx.send(MonitorEvent::new(event_type, data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::network::{AlertLevel, NetworkKind};

    fn fast_config() -> SimulatorConfig {
        SimulatorConfig {
            tick_interval_ms: 10,
            stats_interval_ms: 20,
            scan_interval_ms: 5,
            action_delay_ms: 30,
            seed: Some(42),
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_generates_flows_until_shutdown() {
        let mut soc = SentinelSoc::new(fast_config());
        soc.select_network(NetworkKind::CyberDefense);
        soc.set_alert_level(AlertLevel::Critical);

        let mut monitor = Monitor::new(soc);
        let state = monitor.state();
        let handle = monitor.handle();
        let mut events = monitor.subscribe();

        let runner = tokio::spawn(async move { monitor.run().await });
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.stop().await;
        runner.await.expect("join").expect("run");

        let state = state.read().await;
        assert!(!state.flows().is_empty());
        assert!(state.statistics().total_flows > 0);

        let mut saw_flow = false;
        let mut saw_stats = false;
        while let Ok(event) = events.try_recv() {
            match event.event_type.as_str() {
                "flow_generated" => saw_flow = true,
                "statistics_updated" => saw_stats = true,
                _ => {}
            }
        }
        assert!(saw_flow);
        assert!(saw_stats);
    }

    #[tokio::test]
    async fn test_action_completes_after_delay() {
        let mut soc = SentinelSoc::new(fast_config());
        soc.select_network(NetworkKind::Enterprise);

        // Raise one alert synchronously
        let alert_id = loop {
            let (_, alert) = soc.tick();
            if let Some(alert) = alert {
                break alert.id;
            }
        };

        let monitor = Monitor::new(soc);
        let state = monitor.state();
        let mut events = monitor.subscribe();

        let action_id = monitor
            .execute_action(alert_id, ActionType::BlockIp, "Block attacker IP")
            .await
            .expect("alert exists");

        {
            let state = state.read().await;
            let alert = state.alerts().get(alert_id).expect("alert exists");
            assert_eq!(alert.actions[0].status, crate::types::ActionStatus::InProgress);
        }

        tokio::time::sleep(Duration::from_millis(80)).await;

        {
            let state = state.read().await;
            let alert = state.alerts().get(alert_id).expect("alert exists");
            assert_eq!(alert.actions[0].status, crate::types::ActionStatus::Completed);
            assert!(alert.actions[0].result.is_some());
        }

        let event = events.try_recv().expect("completion event published");
        assert_eq!(event.event_type, "action_completed");
        assert_eq!(
            event.data["action_id"],
            serde_json::json!(action_id.to_string())
        );
    }

    #[tokio::test]
    async fn test_execute_action_unknown_alert() {
        let monitor = Monitor::new(SentinelSoc::new(fast_config()));
        let result = monitor
            .execute_action(Uuid::new_v4(), ActionType::Custom, "noop")
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_scan_events_published() {
        let mut soc = SentinelSoc::new(fast_config());
        soc.select_network(NetworkKind::Enterprise);
        soc.begin_network_scan();

        let mut monitor = Monitor::new(soc);
        let state = monitor.state();
        let handle = monitor.handle();
        let mut events = monitor.subscribe();

        let runner = tokio::spawn(async move { monitor.run().await });
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop().await;
        runner.await.expect("join").expect("run");

        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            if event.event_type == "scan_completed" {
                completed = true;
            }
        }
        assert!(completed, "scan should complete within the test window");

        let state = state.read().await;
        assert!(state.network().is_configured());
        assert!(!state.network().is_scanning());
    }
}
