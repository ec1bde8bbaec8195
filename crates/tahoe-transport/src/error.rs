//! Error taxonomy for the transmission pipeline.
//!
//! Simulated transmission failures (CRC mismatch, loss, timeout) are not
//! errors: they are recorded as fields of a `TransmissionResult`. The types
//! here cover configuration misuse, ARQ contract violations and internal
//! invariant breaches.

use thiserror::Error;

/// Caller-supplied configuration was rejected. Never recorded in history.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid generator polynomial {0:?}")]
    InvalidPolynomial(String),
    #[error("invalid network conditions: {0}")]
    InvalidConditions(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// An ARQ operation was invoked in a state that does not permit it.
/// The engine state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("send while packet {seq} is still awaiting an ACK")]
    AlreadyWaiting { seq: u8 },
    #[error("no outstanding packet")]
    NoOutstanding,
}

/// Internal state broke a numeric invariant. Indicates a bug.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("cwnd {0} fell below 1")]
    CwndBelowOne(f64),
    #[error("ssthresh {0} fell below 1")]
    SsthreshBelowOne(f64),
    #[error("total_acked {acked} exceeds total_sent {sent}")]
    AckedExceedsSent { acked: u64, sent: u64 },
}

/// Failure of a `Pipeline::transmit` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
