//! Per-packet network conditions.
//!
//! All fields are optional in serialized form and default to "clean link".

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Condition flags applied to a single `transmit` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConditions {
    /// Congestion detected: feeds a timeout event to the controller.
    pub congestion: bool,
    /// Feeds a duplicate-ACK event to the controller.
    pub duplicate_ack: bool,
    /// The packet or its ACK may be dropped.
    pub packet_loss: bool,
    /// The retransmission timer fires for this packet.
    pub timeout: bool,
    /// Bit-error rate in percent, `[0, 100]`.
    pub error_rate: f64,
    /// Simulated one-way delay in ms. Informational only.
    #[serde(alias = "delay")]
    pub delay_ms: u64,
}

impl NetworkConditions {
    /// No impairments.
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn with_congestion(mut self) -> Self {
        self.congestion = true;
        self
    }

    pub fn with_duplicate_ack(mut self) -> Self {
        self.duplicate_ack = true;
        self
    }

    pub fn with_packet_loss(mut self) -> Self {
        self.packet_loss = true;
        self
    }

    pub fn with_timeout(mut self) -> Self {
        self.timeout = true;
        self
    }

    pub fn with_error_rate(mut self, percent: f64) -> Self {
        self.error_rate = percent;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Error rate as a probability in `[0, 1]`.
    pub fn error_probability(&self) -> f64 {
        self.error_rate / 100.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.error_rate.is_finite() || !(0.0..=100.0).contains(&self.error_rate) {
            return Err(ConfigError::InvalidConditions(format!(
                "error_rate {} outside [0, 100]",
                self.error_rate
            )));
        }
        Ok(())
    }
}
