//! Synthetic flow generation
//!
//! Produces exactly one [`NetworkFlow`] per tick. Two Bernoulli trials pick
//! the branch: critical (attacker pool, score 75-99), attack (external pool,
//! score 40-74) or benign (score 0, direction decides the IP pairing).

use std::net::IpAddr;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::network::{FlowGenerationConfig, MlModelConfig};
use crate::types::{Direction, FlowStatus, MlPrediction, NetworkFlow, Protocol, ThreatType};

/// Countries stamped on the geo-source field
const COUNTRIES: [&str; 10] = [
    "United States",
    "Russia",
    "China",
    "Germany",
    "Brazil",
    "Colombia",
    "United Kingdom",
    "France",
    "Japan",
    "South Korea",
];

/// Destination geo for every simulated flow
const HOME_COUNTRY: &str = "Colombia";

/// Model name reported when the profile configures no ML models
const FALLBACK_MODEL: &str = "SENTINEL-ML v2.1";

/// Flow score above which a synthetic ML verdict is attached
const ML_PREDICTION_THRESHOLD: u8 = 30;

/// Flow score above which the ML verdict flags an anomaly
const ML_ANOMALY_THRESHOLD: u8 = 50;

/// Synthetic flow generator with an injected PRNG
///
/// Seed the generator for deterministic sequences in tests; identical seeds
/// and inputs produce identical flows.
pub struct FlowGenerator {
    rng: StdRng,
}

impl FlowGenerator {
    /// Create a generator, seeded when `seed` is set, OS entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Produce one flow from the configured pools and probabilities.
    ///
    /// The config pools must be non-empty (guaranteed by
    /// [`NetworkConfig::flow_config`](crate::network::NetworkConfig::flow_config)).
    pub fn generate(
        &mut self,
        config: &FlowGenerationConfig,
        models: &[MlModelConfig],
    ) -> NetworkFlow {
        debug_assert!(!config.base_ips.is_empty());
        debug_assert!(!config.external_ips.is_empty());
        debug_assert!(!config.attacker_ips.is_empty());

        let is_attack = self.rng.random_bool(config.threat_probability.clamp(0.0, 1.0));
        let is_critical = self.rng.random_bool(config.critical_probability.clamp(0.0, 1.0));

        let protocol = if config.protocols.is_empty() {
            self.pick(&Protocol::ALL)
        } else {
            self.pick(&config.protocols)
        };
        let direction = if self.rng.random_bool(0.5) {
            Direction::Inbound
        } else {
            Direction::Outbound
        };

        let src_ip: IpAddr;
        let dst_ip: IpAddr;
        let status: FlowStatus;
        let threat_type: ThreatType;
        let threat_score: u8;

        if is_critical {
            src_ip = self.pick(&config.attacker_ips);
            dst_ip = self.pick(&config.base_ips);
            status = FlowStatus::Critical;
            threat_type = self.pick(&ThreatType::CRITICAL_TYPES);
            threat_score = 75 + self.rng.random_range(0..25);
        } else if is_attack {
            src_ip = self.pick(&config.external_ips);
            dst_ip = self.pick(&config.base_ips);
            status = FlowStatus::Warning;
            threat_type = if self.rng.random_bool(0.5) {
                ThreatType::Anomaly
            } else {
                ThreatType::PortScan
            };
            threat_score = 40 + self.rng.random_range(0..35);
        } else {
            match direction {
                Direction::Outbound => {
                    src_ip = self.pick(&config.base_ips);
                    dst_ip = self.pick(&config.external_ips);
                }
                _ => {
                    src_ip = self.pick(&config.external_ips);
                    dst_ip = self.pick(&config.base_ips);
                }
            }
            status = FlowStatus::Normal;
            threat_type = ThreatType::None;
            threat_score = 0;
        }

        let ml_prediction = if threat_score > ML_PREDICTION_THRESHOLD {
            Some(self.predict(threat_score, threat_type, models))
        } else {
            None
        };

        NetworkFlow {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            src_ip,
            src_port: self.source_port(protocol),
            dst_ip,
            dst_port: protocol.standard_port(),
            protocol,
            direction,
            bytes_in: self.rng.random_range(100..50_000),
            bytes_out: self.rng.random_range(50..30_000),
            packets_in: self.rng.random_range(1..100),
            packets_out: self.rng.random_range(1..80),
            duration_ms: self.rng.random_range(100..60_000),
            status,
            threat_type,
            threat_score,
            geo_source: Some(self.pick(&COUNTRIES).to_string()),
            geo_destination: Some(HOME_COUNTRY.to_string()),
            application_layer: Some(protocol.application_layer().to_string()),
            ml_prediction,
        }
    }

    /// Synthesize the ML verdict for an elevated-score flow
    fn predict(
        &mut self,
        threat_score: u8,
        threat_type: ThreatType,
        models: &[MlModelConfig],
    ) -> MlPrediction {
        let model = if models.is_empty() {
            None
        } else {
            Some(&models[self.rng.random_range(0..models.len())])
        };

        MlPrediction {
            is_anomaly: threat_score > ML_ANOMALY_THRESHOLD,
            confidence: match model {
                Some(model) => model.precision / 100.0,
                None => 0.7 + self.rng.random::<f64>() * 0.3,
            },
            category: threat_type,
            model_used: model
                .map(|m| m.name.clone())
                .unwrap_or_else(|| FALLBACK_MODEL.to_string()),
        }
    }

    /// Ephemeral source port for app-layer protocols, full range otherwise
    fn source_port(&mut self, protocol: Protocol) -> u16 {
        if protocol.uses_ephemeral_source_port() {
            1024 + self.rng.random_range(0..64_000)
        } else {
            self.rng.random_range(0..65_535)
        }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.random_range(0..items.len())]
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
