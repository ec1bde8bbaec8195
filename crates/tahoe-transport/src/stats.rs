//! # Simulation Statistics
//!
//! Aggregate figures folded over a pipeline's transmission history.
//! Serializable for JSON export.

use serde::Serialize;

use crate::pipeline::TransmissionResult;

/// Aggregate outcome of every transmission since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsRecord {
    /// Transmissions recorded.
    pub total: u64,
    /// Transmissions whose frame passed CRC verification.
    pub successes: u64,
    /// `successes / total`, 0 when empty.
    pub success_rate: f64,
    /// ARQ retransmission timeouts as of the latest transmission.
    pub total_timeouts: u64,
    /// Congestion window after the latest transmission.
    pub current_cwnd: f64,
    /// Slow-start threshold after the latest transmission.
    pub current_ssthresh: f64,
    /// Transmissions whose frame was altered in flight.
    pub corrupted: u64,
    /// Transmissions recorded as lost.
    pub lost: u64,
    pub corruption_rate: f64,
    pub loss_rate: f64,
}

impl StatsRecord {
    /// Fold a history into a record. An empty history yields all zeros.
    pub fn from_history(history: &[TransmissionResult]) -> Self {
        let Some(latest) = history.last() else {
            return StatsRecord::default();
        };

        let (successes, corrupted, lost) =
            history.iter().fold((0u64, 0u64, 0u64), |(s, c, l), r| {
                (
                    s + r.crc_verified as u64,
                    c + r.data_corrupted as u64,
                    l + r.packet_lost as u64,
                )
            });
        let total = history.len() as u64;

        StatsRecord {
            total,
            successes,
            success_rate: ratio(successes, total),
            total_timeouts: latest.arq.total_timeouts,
            current_cwnd: latest.cwnd,
            current_ssthresh: latest.ssthresh,
            corrupted,
            lost,
            corruption_rate: ratio(corrupted, total),
            loss_rate: ratio(lost, total),
        }
    }
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_zero_record() {
        let stats = StatsRecord::from_history(&[]);
        assert_eq!(stats, StatsRecord::default());
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.current_cwnd, 0.0);
    }

    #[test]
    fn ratio_zero_div() {
        assert_eq!(ratio(3, 0), 0.0);
        assert!((ratio(1, 4) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn record_serialization() {
        let stats = StatsRecord {
            total: 10,
            successes: 9,
            success_rate: 0.9,
            current_cwnd: 8.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"total\":10"));
        assert!(json.contains("\"success_rate\":0.9"));
    }
}
