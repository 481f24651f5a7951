//! Simulator configuration
//!
//! Tick intervals, store caps and the alert threshold, loadable from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Flow generation interval in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Statistics recomputation interval in milliseconds
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,

    /// Discovery scan progress interval in milliseconds
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    /// Maximum flows retained in the store (oldest evicted first)
    #[serde(default = "default_flow_capacity")]
    pub flow_capacity: usize,

    /// Threat score at or above which a flow raises an alert
    #[serde(default = "default_alert_score_threshold")]
    pub alert_score_threshold: u8,

    /// Simulated execution delay before an action completes, milliseconds
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,

    /// Seed for the flow generator PRNG; omit for OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_tick_interval_ms() -> u64 {
    1500
}

fn default_stats_interval_ms() -> u64 {
    1000
}

fn default_scan_interval_ms() -> u64 {
    200
}

fn default_flow_capacity() -> usize {
    200
}

fn default_alert_score_threshold() -> u8 {
    50
}

fn default_action_delay_ms() -> u64 {
    2000
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            stats_interval_ms: default_stats_interval_ms(),
            scan_interval_ms: default_scan_interval_ms(),
            flow_capacity: default_flow_capacity(),
            alert_score_threshold: default_alert_score_threshold(),
            action_delay_ms: default_action_delay_ms(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: SimulatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Load config from default locations or fall back to defaults
    pub fn load_or_default() -> Result<Self> {
        let paths = [
            PathBuf::from("/etc/sentinel-soc/config.toml"),
            dirs_next::config_dir()
                .map(|p| p.join("sentinel-soc/config.toml"))
                .unwrap_or_default(),
            PathBuf::from("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.tick_interval_ms, 1500);
        assert_eq!(config.stats_interval_ms, 1000);
        assert_eq!(config.flow_capacity, 200);
        assert_eq!(config.alert_score_threshold, 50);
        assert_eq!(config.action_delay_ms, 2000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SimulatorConfig = toml::from_str("tick_interval_ms = 100\nseed = 7\n").unwrap();
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.flow_capacity, 200);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = SimulatorConfig::default();
        config.tick_interval_ms = 250;
        config.seed = Some(42);
        config.save(&path).unwrap();

        let loaded = SimulatorConfig::load(&path).unwrap();
        assert_eq!(loaded.tick_interval_ms, 250);
        assert_eq!(loaded.seed, Some(42));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(SimulatorConfig::load("/nonexistent/config.toml").is_err());
    }
}
