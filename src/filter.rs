//! Provider toggles and the latency range slider

use std::str::FromStr;

use crate::data::{find_exchange, Location, LatencyReading, Provider};
use crate::error::Error;

pub const RANGE_LIMIT_MS: u32 = 500;
pub const RANGE_STEP_MS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderFilter {
    active: Vec<Provider>,
}

impl Default for ProviderFilter {
    fn default() -> Self {
        Self { active: Provider::ALL.to_vec() }
    }
}

impl ProviderFilter {
    pub fn only(providers: &[Provider]) -> Self {
        let mut filter = Self { active: Vec::new() };
        for p in providers {
            if !filter.active.contains(p) {
                filter.active.push(*p);
            }
        }
        filter
    }

    pub fn is_active(&self, provider: Provider) -> bool {
        self.active.contains(&provider)
    }

    pub fn toggle(&mut self, provider: Provider) {
        if let Some(idx) = self.active.iter().position(|p| *p == provider) {
            self.active.remove(idx);
        } else {
            self.active.push(provider);
        }
    }

    pub fn active(&self) -> &[Provider] {
        &self.active
    }

    pub fn allows_location(&self, location: &Location) -> bool {
        self.is_active(location.provider())
    }

    /// Both endpoints must belong to active providers
    pub fn allows_reading(&self, reading: &LatencyReading) -> bool {
        let provider_of = |id: &str| find_exchange(id).map(|e| e.provider);
        matches!(
            (provider_of(&reading.from), provider_of(&reading.to)),
            (Some(a), Some(b)) if self.is_active(a) && self.is_active(b)
        )
    }
}

/// Inclusive latency window in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyRange {
    pub min: u32,
    pub max: u32,
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self { min: 0, max: RANGE_LIMIT_MS }
    }
}

impl LatencyRange {
    pub fn new(min: u32, max: u32) -> Self {
        let max = max.min(RANGE_LIMIT_MS);
        Self { min: min.min(max), max }
    }

    pub fn contains(&self, latency: f64) -> bool {
        latency >= self.min as f64 && latency <= self.max as f64
    }

    pub fn raise_min(&mut self) {
        self.min = (self.min + RANGE_STEP_MS).min(self.max);
    }

    pub fn lower_min(&mut self) {
        self.min = self.min.saturating_sub(RANGE_STEP_MS);
    }

    pub fn raise_max(&mut self) {
        self.max = (self.max + RANGE_STEP_MS).min(RANGE_LIMIT_MS);
    }

    pub fn lower_max(&mut self) {
        self.max = self.max.saturating_sub(RANGE_STEP_MS).max(self.min);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    Heatmap,
    #[default]
    Topology,
}

impl ViewMode {
    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Heatmap => ViewMode::Topology,
            ViewMode::Topology => ViewMode::Heatmap,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Heatmap => "Heatmap",
            ViewMode::Topology => "Topology",
        }
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heatmap" | "heat" => Ok(ViewMode::Heatmap),
            "topology" | "topo" => Ok(ViewMode::Topology),
            _ => Err(Error::InvalidArgument { name: "view", value: s.to_string() }),
        }
    }
}
