//! Stochastic display layer.
//!
//! Presentation-only throughput, latency and energy figures derived from the
//! applied network conditions and an algorithm label. These numbers are
//! independent of the pipeline state machines and never feed back into them.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use tahoe_transport::{ConfigError, NetworkConditions};

/// Congestion control family shown in the display layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Tahoe,
    Reno,
    Cubic,
    Bbr,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Tahoe,
        Algorithm::Reno,
        Algorithm::Cubic,
        Algorithm::Bbr,
    ];

    /// Throughput multiplier relative to Tahoe.
    pub fn multiplier(self) -> f64 {
        match self {
            Algorithm::Tahoe => 1.0,
            Algorithm::Reno => 1.1,
            Algorithm::Cubic => 1.2,
            Algorithm::Bbr => 1.3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Tahoe => "tahoe",
            Algorithm::Reno => "reno",
            Algorithm::Cubic => "cubic",
            Algorithm::Bbr => "bbr",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidConfig(format!("unknown algorithm {:?}", s)))
    }
}

/// Tunables for [`DisplayModel`]. Defaults reproduce the dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub algorithm: Algorithm,
    pub base_throughput_mbps: f64,
    pub congestion_factor: f64,
    pub loss_factor: f64,
    /// Half-width of the uniform throughput jitter.
    pub jitter_mbps: f64,
    pub min_throughput_mbps: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub min_energy_mw: f64,
    pub max_energy_mw: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Tahoe,
            base_throughput_mbps: 8.0,
            congestion_factor: 0.7,
            loss_factor: 0.8,
            jitter_mbps: 1.0,
            min_throughput_mbps: 0.1,
            min_latency_ms: 50.0,
            max_latency_ms: 200.0,
            min_energy_mw: 150.0,
            max_energy_mw: 300.0,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if empty_range(self.min_latency_ms, self.max_latency_ms) {
            return Err(ConfigError::InvalidConfig(format!(
                "display latency range [{}, {}) is empty",
                self.min_latency_ms, self.max_latency_ms
            )));
        }
        if empty_range(self.min_energy_mw, self.max_energy_mw) {
            return Err(ConfigError::InvalidConfig(format!(
                "display energy range [{}, {}) is empty",
                self.min_energy_mw, self.max_energy_mw
            )));
        }
        if !self.jitter_mbps.is_finite() || self.jitter_mbps < 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "display jitter {} must be non-negative",
                self.jitter_mbps
            )));
        }
        Ok(())
    }
}

fn empty_range(lo: f64, hi: f64) -> bool {
    !lo.is_finite() || !hi.is_finite() || lo >= hi
}

/// One display sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayMetrics {
    pub throughput_mbps: f64,
    pub latency_ms: f64,
    pub energy_mw: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DisplayModel {
    config: DisplayConfig,
}

impl DisplayModel {
    pub fn new(config: DisplayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    /// Draw display figures for one transmission under `conditions`.
    pub fn sample(&self, conditions: &NetworkConditions, rng: &mut impl Rng) -> DisplayMetrics {
        let cfg = &self.config;

        let mut throughput = cfg.base_throughput_mbps * cfg.algorithm.multiplier();
        if conditions.congestion {
            throughput *= cfg.congestion_factor;
        }
        if conditions.packet_loss {
            throughput *= cfg.loss_factor;
        }
        if cfg.jitter_mbps > 0.0 {
            throughput += rng.random_range(-cfg.jitter_mbps..cfg.jitter_mbps);
        }

        DisplayMetrics {
            throughput_mbps: throughput.max(cfg.min_throughput_mbps),
            latency_ms: rng.random_range(cfg.min_latency_ms..cfg.max_latency_ms),
            energy_mw: rng.random_range(cfg.min_energy_mw..cfg.max_energy_mw),
        }
    }
}
