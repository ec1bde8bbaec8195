//! # TCP Tahoe Congestion Control
//!
//! Window-based congestion control with slow start, congestion avoidance
//! and fast retransmit, but no fast recovery.
//!
//! ## State Machine
//!
//! ```text
//!                 cwnd ≥ ssthresh
//!   ┌───────────┐ ───────────────▶ ┌──────────────────────┐
//!   │ SLOW_START│                  │ CONGESTION_AVOIDANCE │
//!   │ cwnd × 2  │ ◀─────────────── │ cwnd + 1             │
//!   └───────────┘  timeout / 3rd   └──────────────────────┘
//!                  duplicate ACK
//!                  ssthresh = max(cwnd/2, 1), cwnd = 1
//! ```
//!
//! Growth is applied once per event, modelling one round trip: per-ACK
//! `+1` in slow start accumulates to a doubling per RTT. Growth always
//! follows the stored mode rather than a fresh cwnd/ssthresh comparison.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

// ─── Controller Interface ───────────────────────────────────────────────────

/// Growth regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionMode {
    /// Exponential growth.
    SlowStart,
    /// Linear growth.
    CongestionAvoidance,
}

impl CongestionMode {
    pub fn label(self) -> &'static str {
        match self {
            CongestionMode::SlowStart => "Slow Start",
            CongestionMode::CongestionAvoidance => "Congestion Avoidance",
        }
    }
}

/// Event a controller reacted to, as recorded in its trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CongestionEvent {
    SlowStart,
    CongestionAvoidance,
    Timeout,
    DuplicateAck,
    FastRetransmit,
}

/// Window state captured immediately before an event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSample {
    pub cwnd: f64,
    pub ssthresh: f64,
    pub event: CongestionEvent,
}

/// Congestion controller driven by one event per transmission.
pub trait CongestionControl {
    /// Algorithm name, e.g. `"tahoe"`.
    fn name(&self) -> &'static str;

    /// A normal, successful round.
    fn on_send_or_ack(&mut self);

    /// Retransmission timer expired.
    fn on_timeout(&mut self);

    /// A duplicate ACK arrived. Returns `true` if it triggered fast
    /// retransmit.
    fn on_duplicate_ack(&mut self) -> bool;

    fn cwnd(&self) -> f64;

    fn ssthresh(&self) -> f64;

    fn mode(&self) -> CongestionMode;

    fn check_invariants(&self) -> Result<(), InvariantViolation>;

    /// Return to the initial window.
    fn reset(&mut self);
}

// ─── Tahoe ──────────────────────────────────────────────────────────────────

/// Tahoe parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TahoeConfig {
    /// Slow-start threshold at start and after `reset`.
    pub initial_ssthresh: f64,
    /// Duplicate ACKs that trigger fast retransmit.
    pub dup_ack_threshold: u32,
}

impl Default for TahoeConfig {
    fn default() -> Self {
        TahoeConfig {
            initial_ssthresh: 64.0,
            dup_ack_threshold: 3,
        }
    }
}

/// TCP Tahoe controller for a single flow.
#[derive(Debug, Clone)]
pub struct TahoeController {
    config: TahoeConfig,
    /// Congestion window (segments).
    cwnd: f64,
    /// Slow-start threshold (segments).
    ssthresh: f64,
    mode: CongestionMode,
    /// Consecutive duplicate ACKs since the last normal round.
    dup_ack_count: u32,
    history: Vec<WindowSample>,
}

impl TahoeController {
    pub fn new(config: TahoeConfig) -> Self {
        TahoeController {
            config,
            cwnd: 1.0,
            ssthresh: config.initial_ssthresh,
            mode: CongestionMode::SlowStart,
            dup_ack_count: 0,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &TahoeConfig {
        &self.config
    }

    pub fn dup_ack_count(&self) -> u32 {
        self.dup_ack_count
    }

    /// Pre-event window samples, one per event, oldest first.
    pub fn history(&self) -> &[WindowSample] {
        &self.history
    }

    pub fn state_label(&self) -> &'static str {
        self.mode.label()
    }

    fn record(&mut self, event: CongestionEvent) {
        self.history.push(WindowSample {
            cwnd: self.cwnd,
            ssthresh: self.ssthresh,
            event,
        });
    }

    /// Multiplicative decrease shared by timeout and fast retransmit.
    fn collapse(&mut self) {
        self.ssthresh = (self.cwnd / 2.0).max(1.0);
        self.cwnd = 1.0;
        self.mode = CongestionMode::SlowStart;
        self.dup_ack_count = 0;
    }
}

impl CongestionControl for TahoeController {
    fn name(&self) -> &'static str {
        "tahoe"
    }

    fn on_send_or_ack(&mut self) {
        match self.mode {
            CongestionMode::SlowStart => {
                let exits = self.cwnd * 2.0 >= self.ssthresh;
                self.record(if exits {
                    CongestionEvent::CongestionAvoidance
                } else {
                    CongestionEvent::SlowStart
                });
                self.cwnd *= 2.0;
                if exits {
                    self.cwnd = self.ssthresh;
                    self.mode = CongestionMode::CongestionAvoidance;
                    tracing::debug!(
                        cwnd = self.cwnd,
                        ssthresh = self.ssthresh,
                        "slow start exit"
                    );
                }
            }
            CongestionMode::CongestionAvoidance => {
                self.record(CongestionEvent::CongestionAvoidance);
                self.cwnd += 1.0;
            }
        }
        self.dup_ack_count = 0;
    }

    fn on_timeout(&mut self) {
        self.record(CongestionEvent::Timeout);
        let prev = self.cwnd;
        self.collapse();
        tracing::debug!(prev_cwnd = prev, ssthresh = self.ssthresh, "timeout");
    }

    fn on_duplicate_ack(&mut self) -> bool {
        self.dup_ack_count += 1;
        if self.dup_ack_count < self.config.dup_ack_threshold {
            self.record(CongestionEvent::DuplicateAck);
            return false;
        }

        self.record(CongestionEvent::FastRetransmit);
        let prev = self.cwnd;
        self.collapse();
        tracing::debug!(prev_cwnd = prev, ssthresh = self.ssthresh, "fast retransmit");
        true
    }

    fn cwnd(&self) -> f64 {
        self.cwnd
    }

    fn ssthresh(&self) -> f64 {
        self.ssthresh
    }

    fn mode(&self) -> CongestionMode {
        self.mode
    }

    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.cwnd.is_nan() || self.cwnd < 1.0 {
            return Err(InvariantViolation::CwndBelowOne(self.cwnd));
        }
        if self.ssthresh.is_nan() || self.ssthresh < 1.0 {
            return Err(InvariantViolation::SsthreshBelowOne(self.ssthresh));
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = TahoeController::new(self.config);
    }
}

impl Default for TahoeController {
    fn default() -> Self {
        Self::new(TahoeConfig::default())
    }
}
