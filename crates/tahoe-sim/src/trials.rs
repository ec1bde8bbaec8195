//! Repeated, seeded scenario runs.
//!
//! Trial `i` uses seed `base + i` for its scenario and a derived seed for the
//! pipeline's own draws, so a given configuration always reproduces the same
//! summaries.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tahoe_transport::{Pipeline, PipelineConfig, SimError, StatsRecord};

use crate::scenario::{Scenario, ScenarioConfig};

/// Keeps the pipeline's stream distinct from the scenario stream that shares
/// the same trial seed.
const PIPELINE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Outcome of one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub trial: u32,
    pub seed: u64,
    pub stats: StatsRecord,
}

/// Drive a fresh pipeline through every step of `scenario`.
pub fn run_scenario(
    config: &PipelineConfig,
    scenario: &ScenarioConfig,
    payload: &str,
) -> Result<Pipeline, SimError> {
    scenario.validate()?;

    let mut pipeline = Pipeline::new(config.clone());
    let mut rng = StdRng::seed_from_u64(scenario.seed ^ PIPELINE_SEED_SALT);
    let mut generator = Scenario::new(scenario.clone());

    for step in 0..scenario.steps {
        let conditions = generator.next_conditions();
        let data = format!("{payload} #{step}");
        pipeline.transmit_with(&data, &conditions, &mut rng)?;
    }

    Ok(pipeline)
}

/// Run `trials` independent trials of `scenario`, seeding trial `i` with
/// `scenario.seed + i`.
pub fn run_trials(
    config: &PipelineConfig,
    scenario: &ScenarioConfig,
    payload: &str,
    trials: u32,
) -> Result<Vec<TrialSummary>, SimError> {
    let mut summaries = Vec::with_capacity(trials as usize);

    for trial in 0..trials {
        let seed = scenario.seed.wrapping_add(trial as u64);
        let cfg = ScenarioConfig {
            seed,
            ..scenario.clone()
        };
        let pipeline = run_scenario(config, &cfg, payload)?;
        let stats = pipeline.stats();

        tracing::info!(
            trial,
            seed,
            total = stats.total,
            success_rate = stats.success_rate,
            cwnd = stats.current_cwnd,
            "trial complete"
        );
        summaries.push(TrialSummary { trial, seed, stats });
    }

    Ok(summaries)
}

/// Mean success rate across trials, 0 when there are none.
pub fn mean_success_rate(summaries: &[TrialSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().map(|s| s.stats.success_rate).sum::<f64>() / summaries.len() as f64
}
