//! # tahoe-transport
//!
//! Transport-layer reliability simulator.
//!
//! A per-packet transmission pipeline combining a CRC error-detection codec,
//! a Stop-and-Wait ARQ engine and a TCP Tahoe congestion controller. Network
//! conditions (loss, corruption, congestion signals) are caller-supplied and
//! randomness is injected, so identical seeds reproduce identical runs.
//!
//! ## Crate structure
//!
//! - [`crc`] — Generator polynomials, CRC calculation, framing and verification
//! - [`arq`] — Stop-and-Wait sender with alternating-bit sequencing
//! - [`congestion`] — TCP Tahoe slow start / congestion avoidance
//! - [`conditions`] — Per-packet network condition flags
//! - [`pipeline`] — Orchestrator and append-only transmission history
//! - [`stats`] — Aggregate statistics folded over the history
//! - [`config`] — TOML-backed pipeline configuration
//! - [`rng`] — Injectable random source
//! - [`error`] — Error taxonomy

pub mod arq;
pub mod conditions;
pub mod config;
pub mod congestion;
pub mod crc;
pub mod error;
pub mod pipeline;
pub mod rng;
pub mod stats;

pub use conditions::NetworkConditions;
pub use config::PipelineConfig;
pub use error::{ConfigError, InvariantViolation, ProtocolViolation, SimError};
pub use pipeline::{Pipeline, TransmissionResult};
pub use stats::StatsRecord;
