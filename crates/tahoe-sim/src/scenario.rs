use rand::rngs::StdRng;
use rand::SeedableRng;
use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use tahoe_transport::{ConfigError, NetworkConditions};

/// Configuration for a deterministic network-condition scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    /// Number of transmissions to generate conditions for.
    pub steps: u64,
    pub congestion_probability: f64,
    pub duplicate_ack_probability: f64,
    pub loss_probability: f64,
    pub timeout_probability: f64,
    /// Upper bound of the error-rate walk, in percent.
    pub max_error_rate: f64,
    pub error_step: f64,
    pub base_delay_ms: u64,
    pub delay_jitter_ms: u64,
    pub delay_step_ms: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 20,
            congestion_probability: 0.05,
            duplicate_ack_probability: 0.1,
            loss_probability: 0.1,
            timeout_probability: 0.05,
            max_error_rate: 10.0,
            error_step: 2.0,
            base_delay_ms: 50,
            delay_jitter_ms: 150,
            delay_step_ms: 20,
        }
    }
}

impl ScenarioConfig {
    /// No impairments at all.
    pub fn clean(seed: u64) -> Self {
        Self {
            seed,
            congestion_probability: 0.0,
            duplicate_ack_probability: 0.0,
            loss_probability: 0.0,
            timeout_probability: 0.0,
            max_error_rate: 0.0,
            error_step: 0.0,
            delay_jitter_ms: 0,
            delay_step_ms: 0,
            ..Self::default()
        }
    }

    /// Frequent congestion and duplicate-ACK signals on an otherwise low
    /// error link.
    pub fn congestion_burst(seed: u64) -> Self {
        Self {
            seed,
            steps: 40,
            congestion_probability: 0.25,
            duplicate_ack_probability: 0.3,
            loss_probability: 0.05,
            timeout_probability: 0.05,
            max_error_rate: 2.0,
            error_step: 0.5,
            ..Self::default()
        }
    }

    /// High loss and bit-error rates.
    pub fn lossy(seed: u64) -> Self {
        Self {
            seed,
            steps: 40,
            congestion_probability: 0.05,
            duplicate_ack_probability: 0.05,
            loss_probability: 0.4,
            timeout_probability: 0.15,
            max_error_rate: 40.0,
            error_step: 8.0,
            ..Self::default()
        }
    }

    /// Look up a canned scenario by name.
    pub fn named(name: &str, seed: u64) -> Option<Self> {
        match name {
            "clean" => Some(Self::clean(seed)),
            "congestion_burst" => Some(Self::congestion_burst(seed)),
            "lossy" => Some(Self::lossy(seed)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("congestion_probability", self.congestion_probability),
            ("duplicate_ack_probability", self.duplicate_ack_probability),
            ("loss_probability", self.loss_probability),
            ("timeout_probability", self.timeout_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidConfig(format!(
                    "scenario {} {} outside [0, 1]",
                    name, p
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.max_error_rate) {
            return Err(ConfigError::InvalidConfig(format!(
                "scenario max_error_rate {} outside [0, 100]",
                self.max_error_rate
            )));
        }
        if !self.error_step.is_finite() || self.error_step < 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "scenario error_step {} must be non-negative",
                self.error_step
            )));
        }
        Ok(())
    }
}

/// Deterministic random-walk scenario generator.
///
/// Given a seed, produces a reproducible sequence of [`NetworkConditions`]:
/// the error rate and delay evolve via random-walk steps clamped to the
/// configured bounds, and each condition flag is an independent Bernoulli
/// draw per step.
#[derive(Debug)]
pub struct Scenario {
    cfg: ScenarioConfig,
    rng: StdRng,
    error_rate: f64,
    delay_ms: f64,
}

impl Scenario {
    pub fn new(cfg: ScenarioConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let error_rate = rng.random::<f64>() * cfg.max_error_rate * 0.2;
        let delay_ms = cfg.base_delay_ms as f64;
        Self {
            cfg,
            rng,
            error_rate,
            delay_ms,
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.cfg
    }

    /// Conditions for the next transmission.
    pub fn next_conditions(&mut self) -> NetworkConditions {
        let error_delta = walk_step(&mut self.rng, self.cfg.error_step);
        let delay_delta = walk_step(&mut self.rng, self.cfg.delay_step_ms as f64);

        self.error_rate = (self.error_rate + error_delta).clamp(0.0, self.cfg.max_error_rate);
        self.delay_ms = (self.delay_ms + delay_delta).clamp(
            1.0,
            (self.cfg.base_delay_ms + self.cfg.delay_jitter_ms).max(1) as f64,
        );

        NetworkConditions {
            congestion: self.draw(self.cfg.congestion_probability),
            duplicate_ack: self.draw(self.cfg.duplicate_ack_probability),
            packet_loss: self.draw(self.cfg.loss_probability),
            timeout: self.draw(self.cfg.timeout_probability),
            error_rate: self.error_rate,
            delay_ms: self.delay_ms as u64,
        }
    }

    /// All `steps` conditions, in order.
    pub fn conditions(&mut self) -> Vec<NetworkConditions> {
        (0..self.cfg.steps).map(|_| self.next_conditions()).collect()
    }

    fn draw(&mut self, p: f64) -> bool {
        p > 0.0 && self.rng.random::<f64>() < p
    }
}

/// Uniform step in `[-max_step, max_step]`; no draw when the walk is frozen.
fn walk_step(rng: &mut impl Rng, max_step: f64) -> f64 {
    if max_step > 0.0 {
        rng.random_range(-max_step..=max_step)
    } else {
        0.0
    }
}
