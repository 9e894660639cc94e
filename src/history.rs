//! Simulated latency history for a single link

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::data::LatencyReading;
use crate::error::Error;

/// Peak-to-peak jitter around the current reading
const JITTER_MS: f64 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeRange {
    #[default]
    Hour,
    Day,
    Week,
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [TimeRange::Hour, TimeRange::Day, TimeRange::Week, TimeRange::Month];

    /// (points, interval between points)
    pub fn resolution(&self) -> (usize, Duration) {
        match self {
            TimeRange::Hour => (60, Duration::minutes(1)),
            TimeRange::Day => (144, Duration::minutes(10)),
            TimeRange::Week => (168, Duration::hours(1)),
            TimeRange::Month => (180, Duration::hours(4)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TimeRange::Hour => TimeRange::Day,
            TimeRange::Day => TimeRange::Week,
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Hour,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument { name: "range", value: s.to_string() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub latency: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistoryStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Oldest point first, newest at `now`
pub fn generate_series<R: Rng>(base_latency: f64, range: TimeRange, now: DateTime<Utc>, rng: &mut R) -> Vec<HistoryPoint> {
    let (points, interval) = range.resolution();
    (0..=points)
        .rev()
        .map(|i| {
            let jitter = (rng.gen::<f64>() - 0.5) * JITTER_MS;
            HistoryPoint {
                timestamp: now - interval * i as i32,
                latency: ((base_latency + jitter) * 100.0).round() / 100.0,
            }
        })
        .collect()
}

pub fn stats(series: &[HistoryPoint]) -> HistoryStats {
    if series.is_empty() {
        return HistoryStats::default();
    }
    let (sum, min, max) = series.iter().fold((0.0, f64::INFINITY, f64::NEG_INFINITY), |(s, lo, hi), p| {
        (s + p.latency, lo.min(p.latency), hi.max(p.latency))
    });
    HistoryStats { min, max, avg: sum / series.len() as f64 }
}

/// History panel state: a snapshot of the link plus its series
#[derive(Clone, Debug)]
pub struct HistoryView {
    pub link: LatencyReading,
    pub range: TimeRange,
    pub series: Vec<HistoryPoint>,
    pub stats: HistoryStats,
}

impl HistoryView {
    pub fn open<R: Rng>(link: LatencyReading, range: TimeRange, rng: &mut R) -> Self {
        let series = generate_series(link.latency, range, Utc::now(), rng);
        let stats = stats(&series);
        Self { link, range, series, stats }
    }

    pub fn set_range<R: Rng>(&mut self, range: TimeRange, rng: &mut R) {
        self.range = range;
        self.series = generate_series(self.link.latency, range, Utc::now(), rng);
        self.stats = stats(&self.series);
    }
}
