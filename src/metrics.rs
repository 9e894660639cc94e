//! Aggregate latency metrics for the status panel

use rand::Rng;

use crate::data::LatencyReading;

/// Average latency that fills the threshold gauge
pub const GAUGE_THRESHOLD_MS: f64 = 200.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metrics {
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub active_connections: usize,
    /// Simulated throughput
    pub packets_per_second: u32,
}

impl Metrics {
    /// `None` for an empty reading set so callers keep the last snapshot
    pub fn compute<R: Rng>(readings: &[LatencyReading], rng: &mut R) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let (sum, min, max) = readings.iter().fold((0.0, f64::INFINITY, f64::NEG_INFINITY), |(s, lo, hi), r| {
            (s + r.latency, lo.min(r.latency), hi.max(r.latency))
        });

        Some(Self {
            avg_latency: sum / readings.len() as f64,
            min_latency: min,
            max_latency: max,
            active_connections: readings.len(),
            packets_per_second: rng.gen_range(500..1500),
        })
    }

    /// Gauge fill in percent, capped at 100
    pub fn threshold_percent(&self) -> f64 {
        (self.avg_latency / GAUGE_THRESHOLD_MS * 100.0).min(100.0)
    }
}

/// Thousands separators, e.g. 1234 -> "1,234"
pub fn format_count(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
