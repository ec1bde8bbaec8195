//! # Transmission Pipeline
//!
//! Pure logic, no I/O. Composes the CRC codec, the congestion controller
//! and the Stop-and-Wait engine for one simulated packet at a time, and
//! keeps an append-only history of every outcome.
//!
//! ## Per-packet order
//!
//! 1. **Frame**: `data ‖ CRC(data)`
//! 2. **Congestion event**: `congestion` → timeout, else `duplicate_ack` →
//!    duplicate ACK, else a normal round
//! 3. **ARQ send** of the frame
//! 4. **Corruption**: with probability `error_rate`, flip
//!    `max(1, round(8 · len · error_rate · scale))` random bits
//! 5. **Delivery**: `timeout` → retransmit; `packet_loss` → ACK only if the
//!    loss draw spares the packet; otherwise ACK
//! 6. **Verify** the possibly-corrupted frame
//!
//! Loss, corruption and timeouts are outcomes recorded in the result; only
//! bad configuration or a broken internal invariant aborts `transmit`.

use bytes::Bytes;
use serde::Serialize;

use crate::arq::{ArqCounters, StopAndWait};
use crate::conditions::NetworkConditions;
use crate::config::PipelineConfig;
use crate::congestion::{CongestionControl, CongestionMode, TahoeController};
use crate::crc::{Crc, Frame};
use crate::error::SimError;
use crate::rng::RandomSource;
use crate::stats::StatsRecord;

// ─── Result ─────────────────────────────────────────────────────────────────

/// Outcome of one `transmit` call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmissionResult {
    /// 1-based position in the history.
    pub step: u64,
    /// Data as submitted.
    pub data: String,
    /// Data with CRC appended.
    pub framed: Frame,
    /// Frame as received, present only when bits were flipped in flight.
    pub corrupted: Option<Frame>,
    /// Whether the ARQ engine accepted the frame as a new packet.
    pub packet_sent: bool,
    pub crc_verified: bool,
    pub data_corrupted: bool,
    pub packet_lost: bool,
    /// Whether the retransmission timer fired.
    pub retransmitted: bool,
    pub cwnd: f64,
    pub ssthresh: f64,
    pub mode: CongestionMode,
    pub arq: ArqCounters,
    pub conditions: NetworkConditions,
}

impl TransmissionResult {
    /// The frame the receiver saw.
    pub fn received(&self) -> &Frame {
        self.corrupted.as_ref().unwrap_or(&self.framed)
    }

    /// A transmission counts as successful when its frame verified.
    pub fn success(&self) -> bool {
        self.crc_verified
    }
}

// ─── Pipeline ───────────────────────────────────────────────────────────────

/// Per-flow simulator. Owns its state machines and history exclusively;
/// callers serialize access (`&mut self`).
#[derive(Debug, Clone)]
pub struct Pipeline<C = TahoeController> {
    config: PipelineConfig,
    crc: Crc,
    congestion: C,
    arq: StopAndWait<Frame>,
    history: Vec<TransmissionResult>,
}

impl Pipeline<TahoeController> {
    /// Pipeline with a TCP Tahoe controller.
    pub fn new(config: PipelineConfig) -> Self {
        let controller = TahoeController::new(config.congestion);
        Self::with_controller(config, controller)
    }
}

impl Default for Pipeline<TahoeController> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<C: CongestionControl> Pipeline<C> {
    pub fn with_controller(config: PipelineConfig, congestion: C) -> Self {
        Pipeline {
            crc: Crc::new(config.polynomial.clone()),
            config,
            congestion,
            arq: StopAndWait::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn crc(&self) -> &Crc {
        &self.crc
    }

    pub fn congestion(&self) -> &C {
        &self.congestion
    }

    pub fn arq(&self) -> &StopAndWait<Frame> {
        &self.arq
    }

    /// Name of the congestion control algorithm in use.
    pub fn algorithm(&self) -> &'static str {
        self.congestion.name()
    }

    /// Simulate one packet, drawing randomness from the thread-local RNG.
    pub fn transmit(
        &mut self,
        data: &str,
        conditions: &NetworkConditions,
    ) -> Result<TransmissionResult, SimError> {
        let mut rng = rand::rng();
        self.transmit_with(data, conditions, &mut rng)
    }

    /// Simulate one packet with an explicit random source.
    pub fn transmit_with<R: RandomSource + ?Sized>(
        &mut self,
        data: &str,
        conditions: &NetworkConditions,
        rng: &mut R,
    ) -> Result<TransmissionResult, SimError> {
        conditions.validate()?;

        let framed = self.crc.encode(Bytes::copy_from_slice(data.as_bytes()));

        if conditions.congestion {
            self.congestion.on_timeout();
        } else if conditions.duplicate_ack {
            self.congestion.on_duplicate_ack();
        } else {
            self.congestion.on_send_or_ack();
        }
        self.congestion.check_invariants()?;

        let packet_sent = match self.arq.send(framed.clone()) {
            Ok(_) => true,
            Err(violation) => {
                tracing::debug!(%violation, "frame not accepted by ARQ");
                false
            }
        };

        let received = self.corrupt(&framed, conditions, rng);

        let mut retransmitted = false;
        let mut packet_lost = false;
        if conditions.timeout {
            if self.arq.check_timeout() {
                retransmitted = self.arq.retransmit().is_ok();
            }
        } else if conditions.packet_loss {
            packet_lost = rng.uniform() < self.config.loss_probability;
            if !packet_lost {
                self.acknowledge();
            }
        } else {
            self.acknowledge();
        }
        self.arq.check_invariants()?;

        let crc_verified = self.crc.verify(&received);
        let data_corrupted = received != framed;

        let result = TransmissionResult {
            step: self.history.len() as u64 + 1,
            data: data.to_string(),
            framed,
            corrupted: data_corrupted.then_some(received),
            packet_sent,
            crc_verified,
            data_corrupted,
            packet_lost,
            retransmitted,
            cwnd: self.congestion.cwnd(),
            ssthresh: self.congestion.ssthresh(),
            mode: self.congestion.mode(),
            arq: self.arq.counters(),
            conditions: conditions.clone(),
        };

        tracing::debug!(
            step = result.step,
            crc_verified,
            data_corrupted,
            packet_lost,
            retransmitted,
            cwnd = result.cwnd,
            ssthresh = result.ssthresh,
            "transmission"
        );

        self.history.push(result.clone());
        Ok(result)
    }

    /// Flip random bits of `framed` with probability `error_rate`.
    fn corrupt<R: RandomSource + ?Sized>(
        &self,
        framed: &Frame,
        conditions: &NetworkConditions,
        rng: &mut R,
    ) -> Frame {
        let p = conditions.error_probability();
        if rng.uniform() >= p {
            return framed.clone();
        }

        let scaled = 8.0 * framed.display_len() as f64 * p * self.config.corruption_scale;
        let flips = (scaled.round() as usize).max(1);
        let bit_len = framed.bit_len();
        let positions: Vec<usize> = (0..flips).map(|_| rng.index(bit_len)).collect();
        framed.with_flipped_bits(&positions)
    }

    fn acknowledge(&mut self) {
        let seq = self.arq.current_seq();
        if let Err(violation) = self.arq.receive_ack(seq) {
            tracing::debug!(%violation, seq, "ACK not applied");
        }
    }

    /// Fresh state machines and an empty history. The polynomial and the
    /// rest of the configuration are kept.
    pub fn reset(&mut self) {
        self.congestion.reset();
        self.arq.reset();
        self.history.clear();
        tracing::debug!("pipeline reset");
    }

    /// Every result since the last reset, oldest first.
    pub fn history(&self) -> &[TransmissionResult] {
        &self.history
    }

    pub fn stats(&self) -> StatsRecord {
        StatsRecord::from_history(&self.history)
    }

    pub fn history_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.history)
    }
}
