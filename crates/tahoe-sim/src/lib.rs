//! Simulation tooling for `tahoe-transport`.
//!
//! Provides deterministic scenario generation, repeated seeded trials, the
//! presentation-only display layer and CSV/JSON log export around the core
//! transmission pipeline.

pub mod config;
pub mod display;
pub mod logging;
pub mod report;
pub mod scenario;
pub mod trials;

pub use config::{load_config, SimConfig};
pub use scenario::{Scenario, ScenarioConfig};
pub use trials::{run_scenario, run_trials, TrialSummary};
