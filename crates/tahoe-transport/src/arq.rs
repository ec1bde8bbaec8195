//! # ARQ — Stop-and-Wait
//!
//! Alternating-bit automatic repeat request. At most one packet is in
//! flight; the sender waits for the matching ACK before accepting more data.
//!
//! ```text
//!          send(seq = s)
//!   Idle ───────────────▶ WaitingAck ──┐ retransmit (same s)
//!    ▲                        │   ◀────┘
//!    └──── ACK(s), s ^= 1 ────┘
//! ```
//!
//! ## Key properties
//!
//! - **Same sequence on retransmit**: a timeout re-sends the stored packet
//!   under the sequence number it was first sent with
//! - **Duplicate ACK discard**: an ACK for the wrong sequence is ignored
//! - **Counters**: `total_acked <= total_sent` at all times
//!
//! There is no wall-clock timer: the caller decides that a timeout elapsed.

use serde::Serialize;

use crate::error::{InvariantViolation, ProtocolViolation};

// ─── State ──────────────────────────────────────────────────────────────────

/// Sender state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArqState {
    /// No unacknowledged packet.
    Idle,
    /// One packet outstanding.
    WaitingAck,
}

/// Snapshot of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArqCounters {
    /// Sequence bit the next (or current outstanding) packet carries.
    pub next_seq: u8,
    /// Transmissions including retransmissions.
    pub total_sent: u64,
    /// Accepted ACKs.
    pub total_acked: u64,
    /// Retransmissions triggered by timeouts.
    pub total_timeouts: u64,
}

/// Per-packet record kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentPacket<P> {
    pub seq: u8,
    /// Payload as first sent.
    pub packet: P,
    pub acked: bool,
    pub retransmissions: u32,
}

#[derive(Debug, Clone)]
struct Outstanding<P> {
    seq: u8,
    packet: P,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Stop-and-Wait sender holding at most one packet of type `P`.
#[derive(Debug, Clone)]
pub struct StopAndWait<P> {
    next_seq: u8,
    outstanding: Option<Outstanding<P>>,
    total_sent: u64,
    total_acked: u64,
    total_timeouts: u64,
    log: Vec<SentPacket<P>>,
}

impl<P> StopAndWait<P> {
    pub fn new() -> Self {
        StopAndWait {
            next_seq: 0,
            outstanding: None,
            total_sent: 0,
            total_acked: 0,
            total_timeouts: 0,
            log: Vec::new(),
        }
    }

    pub fn state(&self) -> ArqState {
        if self.outstanding.is_some() {
            ArqState::WaitingAck
        } else {
            ArqState::Idle
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Sequence bit of the outstanding packet, or of the next one to send.
    pub fn current_seq(&self) -> u8 {
        self.next_seq
    }

    pub fn outstanding(&self) -> Option<&P> {
        self.outstanding.as_ref().map(|o| &o.packet)
    }

    pub fn counters(&self) -> ArqCounters {
        ArqCounters {
            next_seq: self.next_seq,
            total_sent: self.total_sent,
            total_acked: self.total_acked,
            total_timeouts: self.total_timeouts,
        }
    }

    /// One entry per original send, in order.
    pub fn packet_log(&self) -> &[SentPacket<P>] {
        &self.log
    }

    /// Send a new packet tagged with the current sequence bit.
    /// Returns the sequence bit used.
    pub fn send(&mut self, packet: P) -> Result<u8, ProtocolViolation>
    where
        P: Clone,
    {
        if let Some(out) = &self.outstanding {
            tracing::debug!(seq = out.seq, "send rejected, ACK pending");
            return Err(ProtocolViolation::AlreadyWaiting { seq: out.seq });
        }

        let seq = self.next_seq;
        self.log.push(SentPacket {
            seq,
            packet: packet.clone(),
            acked: false,
            retransmissions: 0,
        });
        self.outstanding = Some(Outstanding { seq, packet });
        self.total_sent += 1;
        tracing::trace!(seq, total_sent = self.total_sent, "packet sent");
        Ok(seq)
    }

    /// Process an ACK. Returns `Ok(true)` if it acknowledged the outstanding
    /// packet, `Ok(false)` if it was a stale/mismatched ACK and was dropped.
    pub fn receive_ack(&mut self, ack_seq: u8) -> Result<bool, ProtocolViolation> {
        let Some(out) = &self.outstanding else {
            tracing::debug!(ack_seq, "ACK with nothing outstanding");
            return Err(ProtocolViolation::NoOutstanding);
        };

        if out.seq != ack_seq {
            tracing::trace!(ack_seq, expected = out.seq, "duplicate ACK discarded");
            return Ok(false);
        }

        self.outstanding = None;
        self.total_acked += 1;
        self.next_seq ^= 1;
        if let Some(entry) = self.log.last_mut() {
            entry.acked = true;
        }
        tracing::trace!(ack_seq, next_seq = self.next_seq, "ACK accepted");
        Ok(true)
    }

    /// Whether the retransmission timer would fire now, i.e. a packet is
    /// outstanding. Does not change state.
    pub fn check_timeout(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Re-send the outstanding packet under its original sequence bit.
    pub fn retransmit(&mut self) -> Result<&P, ProtocolViolation> {
        let Some(out) = self.outstanding.as_ref() else {
            return Err(ProtocolViolation::NoOutstanding);
        };

        self.total_timeouts += 1;
        self.total_sent += 1;
        if let Some(entry) = self.log.last_mut() {
            entry.retransmissions += 1;
        }
        tracing::debug!(
            seq = out.seq,
            total_timeouts = self.total_timeouts,
            "timeout, retransmitting"
        );
        Ok(&out.packet)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.total_acked > self.total_sent {
            return Err(InvariantViolation::AckedExceedsSent {
                acked: self.total_acked,
                sent: self.total_sent,
            });
        }
        Ok(())
    }

    /// Back to `Idle`, sequence 0, zeroed counters and an empty log.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<P> Default for StopAndWait<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── Send / ACK Cycle ───────────────────────────────────────────────

    #[test]
    fn initial_state_idle_seq_zero() {
        let arq: StopAndWait<&str> = StopAndWait::new();
        assert_eq!(arq.state(), ArqState::Idle);
        assert_eq!(arq.current_seq(), 0);
        assert_eq!(arq.counters(), ArqCounters::default());
        assert!(!arq.check_timeout());
    }

    #[test]
    fn send_then_ack_flips_sequence() {
        let mut arq = StopAndWait::new();
        assert_eq!(arq.send("a"), Ok(0));
        assert_eq!(arq.state(), ArqState::WaitingAck);
        assert_eq!(arq.outstanding(), Some(&"a"));

        assert_eq!(arq.receive_ack(0), Ok(true));
        assert_eq!(arq.state(), ArqState::Idle);
        assert_eq!(arq.current_seq(), 1);
        assert!(arq.outstanding().is_none());

        assert_eq!(arq.send("b"), Ok(1));
        assert_eq!(arq.receive_ack(1), Ok(true));
        assert_eq!(arq.current_seq(), 0);

        let c = arq.counters();
        assert_eq!(c.total_sent, 2);
        assert_eq!(c.total_acked, 2);
    }

    #[test]
    fn send_while_waiting_is_violation() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        assert_eq!(
            arq.send("b"),
            Err(ProtocolViolation::AlreadyWaiting { seq: 0 })
        );
        // State untouched
        assert_eq!(arq.outstanding(), Some(&"a"));
        assert_eq!(arq.counters().total_sent, 1);
    }

    #[test]
    fn mismatched_ack_discarded() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        assert_eq!(arq.receive_ack(1), Ok(false));
        assert_eq!(arq.state(), ArqState::WaitingAck);
        assert_eq!(arq.current_seq(), 0);
        assert_eq!(arq.counters().total_acked, 0);
    }

    #[test]
    fn ack_when_idle_is_violation() {
        let mut arq: StopAndWait<&str> = StopAndWait::new();
        assert_eq!(arq.receive_ack(0), Err(ProtocolViolation::NoOutstanding));
        assert_eq!(arq.counters(), ArqCounters::default());
    }

    // ─── Timeout / Retransmit ───────────────────────────────────────────

    #[test]
    fn check_timeout_does_not_mutate() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        let before = arq.counters();
        assert!(arq.check_timeout());
        assert!(arq.check_timeout());
        assert_eq!(arq.counters(), before);
    }

    #[test]
    fn retransmit_keeps_sequence() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        arq.receive_ack(0).unwrap();
        arq.send("b").unwrap(); // seq 1

        assert_eq!(arq.retransmit(), Ok(&"b"));
        assert_eq!(arq.retransmit(), Ok(&"b"));
        assert_eq!(arq.current_seq(), 1, "retransmission must not advance seq");

        let c = arq.counters();
        assert_eq!(c.total_sent, 4);
        assert_eq!(c.total_timeouts, 2);
        assert_eq!(c.total_acked, 1);

        // The original sequence is still the one that gets acknowledged.
        assert_eq!(arq.receive_ack(1), Ok(true));
        assert_eq!(arq.current_seq(), 0);
    }

    #[test]
    fn retransmit_when_idle_is_violation() {
        let mut arq: StopAndWait<&str> = StopAndWait::new();
        assert_eq!(arq.retransmit(), Err(ProtocolViolation::NoOutstanding));
        assert_eq!(arq.counters().total_timeouts, 0);
    }

    // ─── Log / Reset ────────────────────────────────────────────────────

    #[test]
    fn packet_log_tracks_acks_and_retries() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        arq.retransmit().unwrap();
        arq.receive_ack(0).unwrap();
        arq.send("b").unwrap();

        let log = arq.packet_log();
        assert_eq!(log.len(), 2);
        assert_eq!(
            log[0],
            SentPacket {
                seq: 0,
                packet: "a",
                acked: true,
                retransmissions: 1
            }
        );
        assert_eq!(log[1].seq, 1);
        assert_eq!(log[1].packet, "b");
        assert!(!log[1].acked);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut arq = StopAndWait::new();
        arq.send("a").unwrap();
        arq.retransmit().unwrap();
        arq.reset();
        assert_eq!(arq.state(), ArqState::Idle);
        assert_eq!(arq.counters(), ArqCounters::default());
        assert!(arq.packet_log().is_empty());
    }

    #[test]
    fn invariants_hold_through_cycle() {
        let mut arq = StopAndWait::new();
        for i in 0..10 {
            arq.send(i).unwrap();
            if i % 3 == 0 {
                arq.retransmit().unwrap();
            }
            arq.receive_ack(arq.current_seq()).unwrap();
            assert!(arq.check_invariants().is_ok());
        }
    }
}
