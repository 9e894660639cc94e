use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::data::Provider;
use crate::filter::{LatencyRange, ProviderFilter, ViewMode, RANGE_LIMIT_MS};
use crate::settings::DashboardSettings;

pub const DEFAULT_FRAME_TIME: Duration = Duration::from_millis(50);
pub const DEFAULT_REFRESH_SECS: f64 = 5.0;

/// Fully resolved configuration for the interactive dashboard
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub time_step: Duration,
    pub refresh_interval: Duration,
    pub seed: Option<u64>,
    pub view: ViewMode,
    pub providers: ProviderFilter,
    pub latency_range: LatencyRange,
    pub order_flow: bool,
    pub auto_rotate: f64,
    pub world_map: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_FRAME_TIME,
            refresh_interval: Duration::from_secs_f64(DEFAULT_REFRESH_SECS),
            seed: None,
            view: ViewMode::default(),
            providers: ProviderFilter::default(),
            latency_range: LatencyRange::default(),
            order_flow: true,
            auto_rotate: 0.0,
            world_map: None,
            export_dir: PathBuf::from("."),
        }
    }
}

/// Values given on the command line; `None` defers to the settings file
#[derive(Clone, Debug, Default)]
pub struct DashboardOverrides {
    pub time_step: Option<f32>,
    pub refresh_secs: Option<f64>,
    pub seed: Option<u64>,
    pub view: Option<ViewMode>,
    pub providers: Option<Vec<Provider>>,
    pub min_latency: Option<u32>,
    pub max_latency: Option<u32>,
    pub no_order_flow: bool,
    pub auto_rotate: Option<f64>,
    pub world_map: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

impl DashboardConfig {
    /// defaults ← settings file ← command line
    pub fn resolve(file: &DashboardSettings, cli: &DashboardOverrides) -> Self {
        let defaults = Self::default();

        let file_view = file.view.as_deref().and_then(|v| match v.parse::<ViewMode>() {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("ignoring settings value: {e}");
                None
            }
        });

        let providers = cli
            .providers
            .as_deref()
            .or(file.providers.as_deref())
            .map(ProviderFilter::only)
            .unwrap_or(defaults.providers);

        let min = cli.min_latency.or(file.min_latency).unwrap_or(0);
        let max = cli.max_latency.or(file.max_latency).unwrap_or(RANGE_LIMIT_MS);

        let refresh = cli
            .refresh_secs
            .or(file.refresh_secs)
            .and_then(|s| positive_duration("refresh", s))
            .unwrap_or(defaults.refresh_interval);

        let time_step = cli
            .time_step
            .or(file.frame_time)
            .and_then(|t| positive_duration("frame time", t as f64))
            .unwrap_or(defaults.time_step);

        Self {
            time_step,
            refresh_interval: refresh,
            seed: cli.seed.or(file.seed),
            view: cli.view.or(file_view).unwrap_or(defaults.view),
            providers,
            latency_range: LatencyRange::new(min, max),
            order_flow: !cli.no_order_flow && file.order_flow.unwrap_or(defaults.order_flow),
            auto_rotate: cli.auto_rotate.or(file.auto_rotate).unwrap_or(defaults.auto_rotate),
            world_map: cli.world_map.clone().or_else(|| file.world_map.clone()),
            export_dir: cli.export_dir.clone().or_else(|| file.export_dir.clone()).unwrap_or(defaults.export_dir),
        }
    }
}

/// Seconds as a non-zero `Duration`; negative, NaN or out-of-range values are dropped
fn positive_duration(name: &str, secs: f64) -> Option<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Some(d),
        _ => {
            warn!("ignoring {name} of {secs} s, using default");
            None
        }
    }
}
