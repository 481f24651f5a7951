//! End-to-end pipeline scenarios: generator -> flow store -> classifier ->
//! alert store, plus the timer-driven monitor.

use std::time::Duration;

use sentinel_soc::config::SimulatorConfig;
use sentinel_soc::detection::AlertStore;
use sentinel_soc::engine::Monitor;
use sentinel_soc::network::{AlertLevel, FlowGenerationConfig, NetworkKind};
use sentinel_soc::simulator::{FlowGenerator, FlowStore};
use sentinel_soc::types::{FlowStatus, IocType, Severity};
use sentinel_soc::SentinelSoc;

fn forced_config(threat: f64, critical: f64) -> FlowGenerationConfig {
    FlowGenerationConfig {
        threat_probability: threat,
        critical_probability: critical,
        ..FlowGenerationConfig::default()
    }
}

#[test]
fn forced_attack_branch_produces_no_normal_flows() {
    let mut generator = FlowGenerator::new(Some(1000));
    let config = forced_config(1.0, 0.0);
    let mut flows = FlowStore::new(200);
    let mut alerts = AlertStore::new();

    for _ in 0..120 {
        let flow = generator.generate(&config, &[]);
        assert_ne!(flow.status, FlowStatus::Normal);
        assert!((40..=74).contains(&flow.threat_score));

        flows.push(flow.clone());
        if flow.threat_score >= 50 {
            alerts.create_alert_from_flow(&flow);
        }
    }

    // Scores are uniform over [40, 74], so well over half the ticks qualify
    assert!(alerts.len() >= 50, "only {} alerts raised", alerts.len());
    for alert in alerts.alerts() {
        assert!(
            matches!(alert.severity, Severity::Low | Severity::Medium | Severity::High),
            "unexpected severity {:?}",
            alert.severity
        );
    }
    assert_eq!(
        flows.iter().filter(|f| f.status == FlowStatus::Normal).count(),
        0
    );
}

#[test]
fn forced_critical_branch_raises_high_severity_alerts() {
    let mut generator = FlowGenerator::new(Some(2000));
    let config = forced_config(0.0, 1.0);
    let mut alerts = AlertStore::new();

    for _ in 0..60 {
        let flow = generator.generate(&config, &[]);
        assert_eq!(flow.status, FlowStatus::Critical);
        assert!((75..=99).contains(&flow.threat_score));
        alerts.create_alert_from_flow(&flow);
    }

    assert_eq!(alerts.len(), 60);
    for alert in alerts.alerts() {
        assert!(matches!(alert.severity, Severity::High | Severity::Critical));
        assert!(alert.mitre_technique_id.starts_with('T'));
    }

    // Attacker pool holds three addresses, so IOC dedup caps the list
    assert!(alerts.iocs().len() <= 3);
    assert!(alerts.iocs().iter().all(|i| i.ioc_type == IocType::Ip));
}

#[test]
fn soc_pipeline_caps_flows_and_matches_threshold() {
    let mut soc = SentinelSoc::new(SimulatorConfig {
        seed: Some(3000),
        ..SimulatorConfig::default()
    });
    soc.select_network(NetworkKind::CyberDefense);
    soc.set_alert_level(AlertLevel::Critical);

    let mut raised = 0usize;
    for _ in 0..300 {
        let (flow, alert) = soc.tick();
        assert_eq!(alert.is_some(), flow.threat_score >= 50);
        if alert.is_some() {
            raised += 1;
        }
    }

    assert!(soc.flows().len() <= 200);
    assert_eq!(soc.alerts().len(), raised);
    assert!(raised > 0, "critical alert level should raise alerts in 300 ticks");

    for alert in soc.alerts().alerts() {
        assert!(alert.ml_score >= 50);
        assert_eq!(alert.severity, Severity::from_score(alert.ml_score));
    }

    let first = soc.refresh_statistics();
    let second = soc.refresh_statistics();
    assert_eq!(first.total_flows, second.total_flows);
    assert_eq!(first.threats_detected, second.threats_detected);
}

#[tokio::test]
async fn monitor_drives_pipeline_and_stops_cleanly() {
    let mut soc = SentinelSoc::new(SimulatorConfig {
        tick_interval_ms: 10,
        stats_interval_ms: 25,
        seed: Some(4000),
        ..SimulatorConfig::default()
    });
    soc.select_network(NetworkKind::Tactical);
    soc.set_alert_level(AlertLevel::Critical);

    let mut monitor = Monitor::new(soc);
    let state = monitor.state();
    let handle = monitor.handle();
    let mut events = monitor.subscribe();

    let runner = tokio::spawn(async move { monitor.run().await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop().await;
    runner.await.expect("monitor task").expect("monitor run");

    let state = state.read().await;
    let flows_generated = state.flows().len();
    assert!(flows_generated > 0);
    assert!(state.statistics().total_flows > 0);

    let mut flow_events = 0usize;
    while let Ok(event) = events.try_recv() {
        if event.event_type == "flow_generated" {
            flow_events += 1;
        }
    }
    assert_eq!(flow_events, flows_generated);
}
