use serde::Deserialize;

use crate::congestion::TahoeConfig;
use crate::crc::{GeneratorPolynomial, NamedPolynomial};
use crate::error::ConfigError;

pub const CONFIG_VERSION: u32 = 1;

/// Serialized pipeline settings. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfigInput {
    pub version: u32,
    pub polynomial: Option<String>,
    pub initial_ssthresh: Option<f64>,
    pub dup_ack_threshold: Option<u32>,
    pub loss_probability: Option<f64>,
    pub corruption_scale: Option<f64>,
}

/// Validated pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub version: u32,
    /// Generator used to frame and verify every packet.
    pub polynomial: GeneratorPolynomial,
    pub congestion: TahoeConfig,
    /// Probability that a packet flagged with `packet_loss` is actually lost.
    pub loss_probability: f64,
    /// Fraction of the error rate applied per bit when corrupting a frame.
    pub corruption_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            polynomial: NamedPolynomial::Crc3.polynomial(),
            congestion: TahoeConfig::default(),
            loss_probability: 0.7,
            corruption_scale: 0.1,
        }
    }
}

impl PipelineConfigInput {
    pub fn resolve(self) -> Result<PipelineConfig, ConfigError> {
        let defaults = PipelineConfig::default();

        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::InvalidConfig(format!(
                "unsupported config version {}",
                version
            )));
        }

        let polynomial = match self.polynomial {
            Some(p) => p.trim().parse()?,
            None => defaults.polynomial,
        };

        let initial_ssthresh = self
            .initial_ssthresh
            .unwrap_or(defaults.congestion.initial_ssthresh);
        if !initial_ssthresh.is_finite() || initial_ssthresh < 2.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "initial_ssthresh {} must be at least 2",
                initial_ssthresh
            )));
        }

        let dup_ack_threshold = self
            .dup_ack_threshold
            .unwrap_or(defaults.congestion.dup_ack_threshold);
        if dup_ack_threshold == 0 {
            return Err(ConfigError::InvalidConfig(
                "dup_ack_threshold must be at least 1".into(),
            ));
        }

        let loss_probability = self.loss_probability.unwrap_or(defaults.loss_probability);
        if !(0.0..=1.0).contains(&loss_probability) {
            return Err(ConfigError::InvalidConfig(format!(
                "loss_probability {} outside [0, 1]",
                loss_probability
            )));
        }

        let corruption_scale = self.corruption_scale.unwrap_or(defaults.corruption_scale);
        if !corruption_scale.is_finite() || corruption_scale <= 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "corruption_scale {} must be positive",
                corruption_scale
            )));
        }

        Ok(PipelineConfig {
            version,
            polynomial,
            congestion: TahoeConfig {
                initial_ssthresh,
                dup_ack_threshold,
            },
            loss_probability,
            corruption_scale,
        })
    }
}

impl PipelineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(PipelineConfig::default());
        }
        let parsed: PipelineConfigInput = toml::from_str(input)
            .map_err(|e| ConfigError::InvalidConfig(format!("invalid config TOML: {}", e)))?;
        parsed.resolve()
    }

    pub fn with_polynomial(mut self, polynomial: impl Into<GeneratorPolynomial>) -> Self {
        self.polynomial = polynomial.into();
        self
    }
}
