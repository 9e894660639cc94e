//! Dashboard state: the reading set plus every piece of UI state the panels
//! and the globe renderer read from.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::camera::Camera;
use crate::config::DashboardConfig;
use crate::data::{all_locations, link_endpoints, LatencyReading, LatencySource, Location, Provider};
use crate::export;
use crate::filter::{LatencyRange, ProviderFilter, ViewMode};
use crate::heatmap::{Heatmap, DEFAULT_SIZE};
use crate::history::{HistoryView, TimeRange};
use crate::metrics::Metrics;
use crate::particles::ParticleSystem;
use crate::search::SearchState;

/// How long a searched location stays focused
pub const FOCUS_DURATION: Duration = Duration::from_secs(3);
const STATUS_DURATION: Duration = Duration::from_secs(4);

/// Degrees per keypress
const ROTATE_STEP: f64 = 5.0;

#[derive(Clone, Copy, Debug)]
pub struct Focus {
    pub location: Location,
    since: Instant,
}

pub struct Dashboard {
    source: Box<dyn LatencySource>,
    rng: StdRng,
    pub readings: Vec<LatencyReading>,
    /// Bumped on every refresh
    pub generation: u64,
    pub providers: ProviderFilter,
    pub latency_range: LatencyRange,
    pub view: ViewMode,
    pub order_flow: bool,
    pub metrics: Metrics,
    pub search: SearchState,
    pub focus: Option<Focus>,
    selected_link: Option<(String, String)>,
    pub history: Option<HistoryView>,
    pub history_range: TimeRange,
    status: Option<(String, Instant)>,
    pub camera: Camera,
    pub heatmap: Heatmap,
    pub particles: ParticleSystem,
    pub paused: bool,
    pub show_help: bool,
    pub show_panel: bool,
    refresh_interval: Duration,
    last_refresh: Instant,
    export_dir: PathBuf,
}

impl Dashboard {
    /// Builds the dashboard and takes the first sample immediately
    pub fn new(config: &DashboardConfig, source: Box<dyn LatencySource>, now: Instant) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let mut camera = Camera::default();
        camera.auto_rotate = config.auto_rotate;

        let mut dashboard = Self {
            source,
            rng,
            readings: Vec::new(),
            generation: 0,
            providers: config.providers.clone(),
            latency_range: config.latency_range,
            view: config.view,
            order_flow: config.order_flow,
            metrics: Metrics::default(),
            search: SearchState::default(),
            focus: None,
            selected_link: None,
            history: None,
            history_range: TimeRange::default(),
            status: None,
            camera,
            heatmap: Heatmap::new(DEFAULT_SIZE),
            particles: ParticleSystem::new(),
            paused: false,
            show_help: false,
            show_panel: true,
            refresh_interval: config.refresh_interval,
            last_refresh: now,
            export_dir: config.export_dir.clone(),
        };
        dashboard.refresh(now);
        dashboard
    }

    /// Replace the whole reading set with a fresh sample
    pub fn refresh(&mut self, now: Instant) {
        self.readings = self.source.sample();
        self.generation += 1;
        self.last_refresh = now;
        if let Some(metrics) = Metrics::compute(&self.readings, &mut self.rng) {
            self.metrics = metrics;
        }
        self.rebuild_heatmap();
        debug!(generation = self.generation, readings = self.readings.len(), "refreshed latency readings");
    }

    /// Timers: data refresh, focus expiry and status expiry
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.focus.is_some_and(|f| now.duration_since(f.since) >= FOCUS_DURATION) {
            self.focus = None;
            self.camera.clear_target();
        }
        if self.status.as_ref().is_some_and(|(_, at)| now.duration_since(*at) >= STATUS_DURATION) {
            self.status = None;
        }
        if !self.paused && now.duration_since(self.last_refresh) >= self.refresh_interval {
            self.refresh(now);
            return true;
        }
        false
    }

    /// Per-frame animation step
    pub fn frame(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        self.camera.update(dt);

        if self.order_flow {
            let (providers, range) = (&self.providers, self.latency_range);
            let links = self.readings.iter().filter(|r| link_visible(r, providers, range));
            self.particles.spawn(links, link_endpoints, &mut self.rng);
            self.particles.step(dt);
        } else if !self.particles.is_empty() {
            self.particles.clear();
        }
    }

    /// Readings drawn as arcs: both providers active and latency in range
    pub fn visible_links(&self) -> impl Iterator<Item = &LatencyReading> {
        self.readings
            .iter()
            .filter(move |r| link_visible(r, &self.providers, self.latency_range))
    }

    pub fn visible_locations(&self) -> impl Iterator<Item = Location> + '_ {
        all_locations().filter(move |l| self.providers.allows_location(l))
    }

    pub fn selected_link(&self) -> Option<&LatencyReading> {
        let (from, to) = self.selected_link.as_ref()?;
        self.visible_links().find(|r| &r.from == from && &r.to == to)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now));
    }

    /// Write the current readings to a CSV file; failures end up in the status line
    pub fn export(&mut self, now: Instant) {
        match export::export_to_dir(&self.export_dir, &self.readings, Utc::now()) {
            Ok(path) => {
                let msg = format!("Exported {} readings to {}", self.readings.len(), path.display());
                self.set_status(msg, now);
            }
            Err(e) => {
                error!(dir = %self.export_dir.display(), error = %e, "export failed");
                self.set_status(format!("Export failed: {e}"), now);
            }
        }
    }

    /// Handle a keypress, returns true if the user asked to quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        if self.search.active {
            self.handle_search_key(code, now);
            return false;
        }
        if self.show_help {
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                _ => {}
            }
            return false;
        }
        if self.history.is_some() {
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Enter => self.history = None,
                KeyCode::Char('t') => self.cycle_history_range(),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('p') => self.show_panel = !self.show_panel,
            KeyCode::Char('1') => self.toggle_provider(Provider::Aws),
            KeyCode::Char('2') => self.toggle_provider(Provider::Gcp),
            KeyCode::Char('3') => self.toggle_provider(Provider::Azure),
            KeyCode::Char('v') => self.view = self.view.toggled(),
            KeyCode::Char('o') => self.order_flow = !self.order_flow,
            KeyCode::Char('[') => self.adjust_range(LatencyRange::lower_min),
            KeyCode::Char(']') => self.adjust_range(LatencyRange::raise_min),
            KeyCode::Char('{') => self.adjust_range(LatencyRange::lower_max),
            KeyCode::Char('}') => self.adjust_range(LatencyRange::raise_max),
            KeyCode::Char('/') => self.search.open(),
            KeyCode::Tab => self.cycle_link(true),
            KeyCode::BackTab => self.cycle_link(false),
            KeyCode::Enter => self.open_history(now),
            KeyCode::Char('t') => self.history_range = self.history_range.next(),
            KeyCode::Char('e') => self.export(now),
            KeyCode::Left | KeyCode::Char('h') => self.camera.rotate(-ROTATE_STEP),
            KeyCode::Right | KeyCode::Char('l') => self.camera.rotate(ROTATE_STEP),
            KeyCode::Up | KeyCode::Char('k') => self.camera.tilt(ROTATE_STEP),
            KeyCode::Down | KeyCode::Char('j') => self.camera.tilt(-ROTATE_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.camera.zoom_out(),
            KeyCode::Char('0') => self.camera.reset(),
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Esc => self.search.close(),
            KeyCode::Enter => {
                if let Some(location) = self.search.select() {
                    self.focus_on(location, now);
                }
            }
            KeyCode::Up | KeyCode::BackTab => self.search.move_cursor(false),
            KeyCode::Down | KeyCode::Tab => self.search.move_cursor(true),
            KeyCode::Backspace => self.search.pop(),
            KeyCode::Char(c) => self.search.push(c),
            _ => {}
        }
    }

    /// Highlight a location and fly the camera to it
    pub fn focus_on(&mut self, location: Location, now: Instant) {
        let pos = location.position();
        self.camera.fly_to(pos.lat, pos.lon);
        self.focus = Some(Focus { location, since: now });
        info!(id = location.id(), "focused location");
    }

    pub fn toggle_provider(&mut self, provider: Provider) {
        self.providers.toggle(provider);
        self.rebuild_heatmap();
    }

    fn adjust_range(&mut self, step: fn(&mut LatencyRange)) {
        step(&mut self.latency_range);
        self.rebuild_heatmap();
    }

    fn cycle_link(&mut self, forward: bool) {
        let links: Vec<(String, String)> = self.visible_links().map(|r| (r.from.clone(), r.to.clone())).collect();
        if links.is_empty() {
            self.selected_link = None;
            return;
        }
        let n = links.len();
        let current = self.selected_link.as_ref().and_then(|sel| links.iter().position(|l| l == sel));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.selected_link = Some(links[next].clone());
    }

    fn open_history(&mut self, now: Instant) {
        match self.selected_link().cloned() {
            Some(link) => self.history = Some(HistoryView::open(link, self.history_range, &mut self.rng)),
            None => self.set_status("Select a link with Tab first", now),
        }
    }

    fn cycle_history_range(&mut self) {
        self.history_range = self.history_range.next();
        if let Some(view) = self.history.as_mut() {
            view.set_range(self.history_range, &mut self.rng);
        }
    }

    fn rebuild_heatmap(&mut self) {
        let visible: Vec<LatencyReading> = self.visible_links().cloned().collect();
        self.heatmap.rebuild(&visible);
    }
}

fn link_visible(reading: &LatencyReading, providers: &ProviderFilter, range: LatencyRange) -> bool {
    providers.allows_reading(reading) && range.contains(reading.latency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_readings, EXCHANGES};
    use crate::search::search;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Deterministic source that counts how often it was sampled
    struct CountingSource {
        rng: StdRng,
        calls: Rc<Cell<usize>>,
        empty_after: Option<usize>,
    }

    impl LatencySource for CountingSource {
        fn sample(&mut self) -> Vec<LatencyReading> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if self.empty_after.is_some_and(|limit| n > limit) {
                return Vec::new();
            }
            generate_readings(EXCHANGES, &mut self.rng, Utc::now())
        }
    }

    fn dashboard_with(config: DashboardConfig, empty_after: Option<usize>) -> (Dashboard, Rc<Cell<usize>>, Instant) {
        let calls = Rc::new(Cell::new(0));
        let source = CountingSource { rng: StdRng::seed_from_u64(21), calls: calls.clone(), empty_after };
        let start = Instant::now();
        (Dashboard::new(&config, Box::new(source), start), calls, start)
    }

    fn dashboard() -> (Dashboard, Rc<Cell<usize>>, Instant) {
        let config = DashboardConfig { seed: Some(5), ..DashboardConfig::default() };
        dashboard_with(config, None)
    }

    fn press(d: &mut Dashboard, code: KeyCode, now: Instant) -> bool {
        d.handle_key(code, KeyModifiers::NONE, now)
    }

    #[test]
    fn samples_on_startup() {
        let (d, calls, _) = dashboard();
        assert_eq!(calls.get(), 1);
        assert_eq!(d.readings.len(), 28);
        assert_eq!(d.metrics.active_connections, 28);
        assert_eq!(d.generation, 1);
    }

    #[test]
    fn refresh_waits_for_interval() {
        let (mut d, calls, start) = dashboard();
        assert!(!d.tick(start + Duration::from_millis(4999)));
        assert_eq!(calls.get(), 1);
        assert!(d.tick(start + Duration::from_secs(5)));
        assert_eq!(calls.get(), 2);
        assert_eq!(d.generation, 2);
        assert!(!d.tick(start + Duration::from_secs(6)));
    }

    #[test]
    fn paused_dashboard_does_not_refresh() {
        let (mut d, calls, start) = dashboard();
        press(&mut d, KeyCode::Char(' '), start);
        assert!(!d.tick(start + Duration::from_secs(30)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn empty_sample_keeps_previous_metrics() {
        let config = DashboardConfig::default();
        let (mut d, _, start) = dashboard_with(config, Some(1));
        let before = d.metrics;
        d.tick(start + Duration::from_secs(5));
        assert!(d.readings.is_empty());
        assert_eq!(d.metrics, before);
    }

    #[test]
    fn search_focus_clears_after_three_seconds() {
        let (mut d, _, start) = dashboard();
        press(&mut d, KeyCode::Char('/'), start);
        for c in "binance".chars() {
            press(&mut d, KeyCode::Char(c), start);
        }
        press(&mut d, KeyCode::Enter, start);
        assert!(!d.search.active);
        assert_eq!(d.focus.map(|f| f.location.id()), Some("binance-tokyo"));
        assert!(d.camera.target().is_some());

        d.tick(start + Duration::from_millis(2900));
        assert!(d.focus.is_some());
        d.tick(start + FOCUS_DURATION);
        assert!(d.focus.is_none());
        assert!(d.camera.target().is_none());
    }

    #[test]
    fn typing_q_while_searching_does_not_quit() {
        let (mut d, _, start) = dashboard();
        press(&mut d, KeyCode::Char('/'), start);
        assert!(!press(&mut d, KeyCode::Char('q'), start));
        assert_eq!(d.search.query, "q");
        press(&mut d, KeyCode::Esc, start);
        assert!(!d.search.active);
        assert!(press(&mut d, KeyCode::Char('q'), start));
    }

    #[test]
    fn provider_keys_filter_links_and_markers() {
        let (mut d, _, start) = dashboard();
        let all_links = d.visible_links().count();
        press(&mut d, KeyCode::Char('1'), start);
        assert!(d.visible_locations().all(|l| l.provider() != Provider::Aws));
        assert!(d.visible_links().count() < all_links);
        press(&mut d, KeyCode::Char('1'), start);
        assert_eq!(d.visible_links().count(), all_links);
    }

    #[test]
    fn range_keys_keep_min_below_max() {
        let (mut d, _, start) = dashboard();
        for _ in 0..60 {
            press(&mut d, KeyCode::Char(']'), start);
        }
        assert_eq!(d.latency_range.min, d.latency_range.max);
        press(&mut d, KeyCode::Char('{'), start);
        assert!(d.latency_range.min <= d.latency_range.max);
        assert!(d.visible_links().all(|r| d.latency_range.contains(r.latency)));
    }

    #[test]
    fn tab_selects_links_and_enter_opens_history() {
        let (mut d, _, start) = dashboard();
        press(&mut d, KeyCode::Enter, start);
        assert!(d.history.is_none());
        assert!(d.status().is_some());

        press(&mut d, KeyCode::Tab, start);
        let first = d.selected_link().cloned().unwrap();
        press(&mut d, KeyCode::Tab, start);
        press(&mut d, KeyCode::BackTab, start);
        assert_eq!(d.selected_link(), Some(&first));

        press(&mut d, KeyCode::Enter, start);
        let view = d.history.as_ref().unwrap();
        assert_eq!(view.link, first);
        assert_eq!(view.series.len(), 61);

        press(&mut d, KeyCode::Char('t'), start);
        let view = d.history.as_ref().unwrap();
        assert_eq!(view.range, TimeRange::Day);
        assert_eq!(view.series.len(), 145);

        press(&mut d, KeyCode::Esc, start);
        assert!(d.history.is_none());
    }

    #[test]
    fn export_key_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig { export_dir: dir.path().to_path_buf(), ..DashboardConfig::default() };
        let (mut d, _, start) = dashboard_with(config, None);
        press(&mut d, KeyCode::Char('e'), start);
        assert!(d.status().unwrap().starts_with("Exported 28 readings"));

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        d.tick(start + STATUS_DURATION);
        assert!(d.status().is_none());
    }

    #[test]
    fn order_flow_toggle_clears_particles() {
        let (mut d, _, start) = dashboard();
        for _ in 0..20 {
            d.frame(0.05);
        }
        assert!(!d.particles.is_empty());
        press(&mut d, KeyCode::Char('o'), start);
        d.frame(0.05);
        assert!(d.particles.is_empty());
    }

    #[test]
    fn view_toggle_and_help() {
        let (mut d, _, start) = dashboard();
        assert_eq!(d.view, ViewMode::Topology);
        press(&mut d, KeyCode::Char('v'), start);
        assert_eq!(d.view, ViewMode::Heatmap);

        press(&mut d, KeyCode::Char('?'), start);
        assert!(d.show_help);
        press(&mut d, KeyCode::Char('v'), start);
        assert_eq!(d.view, ViewMode::Heatmap);
        press(&mut d, KeyCode::Esc, start);
        assert!(!d.show_help);
    }

    #[test]
    fn focus_on_search_result() {
        let (mut d, _, start) = dashboard();
        let region = search("eastasia")[0];
        d.focus_on(region, start);
        let pos = region.position();
        assert_eq!(d.camera.target(), Some((pos.lat, pos.lon)));
    }
}
