use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tahoe_transport::config::PipelineConfigInput;
use tahoe_transport::{ConfigError, PipelineConfig};

use crate::display::DisplayConfig;
use crate::scenario::ScenarioConfig;

/// Serialized simulation settings: one TOML file with optional
/// `[pipeline]`, `[scenario]` and `[display]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimConfigInput {
    pub pipeline: PipelineConfigInput,
    pub scenario: ScenarioConfig,
    pub display: DisplayConfig,
}

/// Validated simulation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimConfig {
    pub pipeline: PipelineConfig,
    pub scenario: ScenarioConfig,
    pub display: DisplayConfig,
}

impl SimConfigInput {
    pub fn resolve(self) -> Result<SimConfig, ConfigError> {
        let pipeline = self.pipeline.resolve()?;
        self.scenario.validate()?;
        self.display.validate()?;
        Ok(SimConfig {
            pipeline,
            scenario: self.scenario,
            display: self.display,
        })
    }
}

impl SimConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let parsed: SimConfigInput = toml::from_str(input)
            .map_err(|e| ConfigError::InvalidConfig(format!("invalid config TOML: {}", e)))?;
        parsed.resolve()
    }
}

/// Read and validate a simulation config file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<SimConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = SimConfig::from_toml_str(&text)
        .with_context(|| format!("loading config {}", path.display()))?;
    tracing::info!(path = %path.display(), polynomial = %config.pipeline.polynomial, "config loaded");
    Ok(config)
}
