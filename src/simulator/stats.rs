//! Rolling flow statistics
//!
//! Pure recomputation from the current flow list; no history is kept beyond
//! the flows themselves, so repeated calls over an unchanged list are
//! idempotent.

use chrono::{DateTime, Duration, Utc};

use crate::types::{FlowStatistics, FlowStatus, NetworkFlow};

/// Recompute the rolling counters from the live flow list.
///
/// The per-second figures count everything observed within the trailing
/// one-second window ending at `now`.
pub fn compute_statistics<'a>(
    flows: impl Iterator<Item = &'a NetworkFlow>,
    now: DateTime<Utc>,
) -> FlowStatistics {
    let window_start = now - Duration::seconds(1);
    let mut stats = FlowStatistics::default();

    for flow in flows {
        stats.total_flows += 1;

        if flow.timestamp > window_start {
            stats.flows_per_second += 1;
            stats.bytes_per_second += flow.total_bytes();
            stats.packets_per_second += flow.total_packets();
        }

        match flow.status {
            FlowStatus::Normal => stats.active_connections += 1,
            FlowStatus::Blocked => stats.blocked_connections += 1,
            _ => {}
        }

        if flow.is_threat() {
            stats.threats_detected += 1;
        }

        if flow.ml_prediction.as_ref().map_or(false, |p| p.is_anomaly) {
            stats.anomalies_detected += 1;
        }
    }

    stats
}
