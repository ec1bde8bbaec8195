//! Per-step log rows for export.
//!
//! Rows pair each recorded transmission with one display sample. Rendering
//! produces strings; writing them anywhere is up to the caller.

use std::fmt::Write as _;

use rand::Rng;
use serde::Serialize;
use tahoe_transport::TransmissionResult;

use crate::display::DisplayModel;

pub const CSV_HEADER: &str = "step,algorithm,throughput,latency,energy,success";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub step: u64,
    pub algorithm: String,
    /// Mbps.
    pub throughput: f64,
    /// ms.
    pub latency: f64,
    /// mW.
    pub energy: f64,
    pub success: bool,
}

/// One row per history entry, in history order.
pub fn log_rows(
    history: &[TransmissionResult],
    display: &DisplayModel,
    rng: &mut impl Rng,
) -> Vec<LogRow> {
    history
        .iter()
        .map(|result| {
            let metrics = display.sample(&result.conditions, &mut *rng);
            LogRow {
                step: result.step,
                algorithm: display.algorithm().to_string(),
                throughput: metrics.throughput_mbps,
                latency: metrics.latency_ms,
                energy: metrics.energy_mw,
                success: result.success(),
            }
        })
        .collect()
}

pub fn to_csv(rows: &[LogRow]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + rows.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{:.3},{:.3},{:.3},{}",
            row.step, row.algorithm, row.throughput, row.latency, row.energy, row.success
        );
    }
    out
}

pub fn to_json(rows: &[LogRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
