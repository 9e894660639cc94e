//! Rotating braille globe with latency arcs, topology and heatmap overlay

use chrono::{DateTime, Timelike, Utc};
use crossterm::style::Color;
use rand::prelude::*;
use std::time::Instant;
use tracing::info;

use super::braille::{BrailleCanvas, Layer};
use super::{chart, panels};
use crate::camera::Camera;
use crate::colors::{band_color, dim, flow_color, hex_color, palette, provider_color, rgb};
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::data::{link_endpoints, Location, SyntheticSource};
use crate::error::Result;
use crate::filter::ViewMode;
use crate::geo::{
    lat_lon_to_vec3, normalize_longitude, sample_arc, shortest_angular_delta, vec3_to_lat_lon, Vec3, GLOBE_RADIUS,
};
use crate::help::{render_help_overlay, HELP};
use crate::terminal::Terminal;
use crate::texture::WorldTexture;
use crate::topology::{self, LinkKind};

const STAR_COUNT: usize = 400;
const ARC_SEGMENTS: usize = 40;
/// Dark ocean under the heatmap when no world texture is loaded
const OCEAN: [f64; 3] = [6.0, 14.0, 26.0];

/// Coarse coastline polylines, (lat, lon) in degrees
const COASTLINES: &[&[(f64, f64)]] = &[
    // North America
    &[
        (70.0, -165.0), (71.0, -156.0), (69.0, -140.0), (70.0, -128.0), (68.0, -110.0), (68.0, -96.0),
        (64.0, -87.0), (58.0, -94.0), (55.0, -82.0), (52.0, -79.0), (60.0, -77.0), (62.0, -72.0),
        (58.0, -68.0), (60.0, -64.0), (53.0, -56.0), (47.0, -53.0), (45.0, -61.0), (44.0, -66.0),
        (42.0, -70.0), (41.0, -72.0), (37.0, -76.0), (35.0, -76.0), (32.0, -81.0), (27.0, -80.0),
        (25.0, -81.0), (30.0, -84.0), (30.0, -89.0), (29.0, -94.0), (26.0, -97.0), (22.0, -98.0),
        (19.0, -96.0), (21.0, -90.0), (18.0, -88.0), (16.0, -88.0), (15.0, -84.0), (11.0, -84.0),
        (9.0, -80.0), (8.0, -78.0), (9.0, -84.0), (13.0, -88.0), (16.0, -95.0), (19.0, -105.0),
        (23.0, -106.0), (27.0, -111.0), (31.0, -113.0), (23.0, -110.0), (28.0, -115.0), (32.0, -117.0),
        (35.0, -121.0), (38.0, -123.0), (42.0, -124.0), (46.0, -124.0), (49.0, -125.0), (54.0, -131.0),
        (58.0, -137.0), (60.0, -146.0), (59.0, -152.0), (57.0, -157.0), (55.0, -163.0), (58.0, -158.0),
        (60.0, -162.0), (62.0, -166.0), (66.0, -164.0), (68.0, -166.0), (70.0, -165.0),
    ],
    // South America
    &[
        (12.0, -72.0), (11.0, -64.0), (8.0, -60.0), (5.0, -53.0), (0.0, -50.0), (-3.0, -41.0),
        (-5.0, -35.0), (-10.0, -36.0), (-13.0, -39.0), (-23.0, -42.0), (-25.0, -48.0), (-29.0, -49.0),
        (-34.0, -53.0), (-35.0, -57.0), (-39.0, -62.0), (-42.0, -64.0), (-46.0, -67.0), (-50.0, -68.0),
        (-53.0, -70.0), (-55.0, -68.0), (-52.0, -75.0), (-46.0, -75.0), (-40.0, -74.0), (-33.0, -72.0),
        (-27.0, -71.0), (-18.0, -70.0), (-14.0, -76.0), (-6.0, -81.0), (-2.0, -81.0), (1.0, -80.0),
        (4.0, -77.0), (8.0, -77.0), (9.0, -76.0), (12.0, -72.0),
    ],
    // Europe, Atlantic and Baltic
    &[
        (36.0, -6.0), (37.0, -9.0), (43.0, -9.0), (43.0, -2.0), (46.0, -1.0), (48.0, -5.0),
        (49.0, 0.0), (51.0, 2.0), (53.0, 5.0), (54.0, 9.0), (57.0, 8.0), (58.0, 10.0),
        (56.0, 11.0), (54.0, 11.0), (54.0, 14.0), (55.0, 19.0), (57.0, 21.0), (59.0, 23.0),
        (60.0, 29.0), (61.0, 22.0), (65.0, 22.0), (66.0, 25.0), (64.0, 21.0), (61.0, 17.0),
        (59.0, 18.0), (56.0, 16.0), (56.0, 13.0), (59.0, 11.0), (58.0, 7.0), (60.0, 5.0),
        (63.0, 8.0), (67.0, 14.0), (70.0, 19.0), (71.0, 26.0), (70.0, 31.0), (69.0, 33.0),
    ],
    // Europe, Mediterranean
    &[
        (36.0, -6.0), (37.0, -2.0), (39.0, 0.0), (41.0, 2.0), (43.0, 3.0), (43.0, 7.0),
        (44.0, 9.0), (42.0, 12.0), (40.0, 15.0), (38.0, 16.0), (40.0, 17.0), (40.0, 18.0),
        (42.0, 16.0), (44.0, 13.0), (45.0, 13.0), (43.0, 16.0), (40.0, 20.0), (37.0, 22.0),
        (38.0, 24.0), (40.0, 23.0), (41.0, 26.0), (40.0, 27.0), (37.0, 27.0), (36.0, 30.0),
        (37.0, 36.0), (35.0, 36.0), (33.0, 35.0), (31.0, 34.0), (31.0, 32.0),
    ],
    // Africa
    &[
        (36.0, -6.0), (35.0, -2.0), (37.0, 10.0), (33.0, 11.0), (31.0, 20.0), (32.0, 30.0),
        (31.0, 32.0), (27.0, 34.0), (22.0, 37.0), (15.0, 40.0), (12.0, 43.0), (11.0, 51.0),
        (2.0, 46.0), (-4.0, 40.0), (-10.0, 40.0), (-16.0, 40.0), (-20.0, 35.0), (-25.0, 35.0),
        (-30.0, 31.0), (-34.0, 26.0), (-35.0, 20.0), (-32.0, 18.0), (-28.0, 16.0), (-22.0, 14.0),
        (-17.0, 12.0), (-12.0, 14.0), (-6.0, 12.0), (-1.0, 9.0), (4.0, 9.0), (5.0, 2.0),
        (5.0, -4.0), (5.0, -8.0), (7.0, -12.0), (10.0, -15.0), (15.0, -17.0), (21.0, -17.0),
        (27.0, -13.0), (30.0, -10.0), (34.0, -7.0), (36.0, -6.0),
    ],
    // Asia
    &[
        (30.0, 33.0), (21.0, 39.0), (13.0, 43.0), (17.0, 54.0), (22.0, 60.0), (25.0, 57.0),
        (25.0, 62.0), (25.0, 67.0), (22.0, 70.0), (19.0, 73.0), (13.0, 75.0), (8.0, 77.0),
        (13.0, 80.0), (16.0, 82.0), (20.0, 87.0), (22.0, 90.0), (21.0, 92.0), (16.0, 95.0),
        (16.0, 98.0), (10.0, 98.0), (7.0, 100.0), (1.0, 104.0), (4.0, 103.0), (8.0, 100.0),
        (13.0, 100.0), (12.0, 103.0), (9.0, 105.0), (11.0, 109.0), (16.0, 108.0), (19.0, 106.0),
        (21.0, 107.0), (22.0, 110.0), (23.0, 117.0), (26.0, 120.0), (30.0, 122.0), (32.0, 121.0),
        (35.0, 120.0), (37.0, 122.0), (39.0, 118.0), (41.0, 121.0), (39.0, 122.0), (38.0, 125.0),
        (35.0, 126.0), (35.0, 129.0), (38.0, 129.0), (40.0, 128.0), (42.0, 130.0), (43.0, 133.0),
        (46.0, 138.0), (50.0, 140.0), (54.0, 141.0), (54.0, 137.0), (59.0, 143.0), (59.0, 151.0),
        (62.0, 157.0), (60.0, 163.0), (57.0, 162.0), (51.0, 157.0), (56.0, 162.0), (60.0, 166.0),
        (62.0, 175.0), (65.0, -176.0), (67.0, -172.0), (69.0, 180.0), (70.0, 170.0), (71.0, 160.0),
        (72.0, 150.0), (71.0, 140.0), (73.0, 128.0), (73.0, 120.0), (77.0, 105.0), (76.0, 98.0),
        (74.0, 87.0), (73.0, 80.0), (69.0, 73.0), (68.0, 66.0), (69.0, 58.0), (67.0, 44.0),
        (66.0, 40.0), (64.0, 37.0), (66.0, 33.0), (69.0, 33.0),
    ],
    // Australia
    &[
        (-11.0, 132.0), (-12.0, 137.0), (-15.0, 135.0), (-18.0, 140.0), (-11.0, 142.0), (-15.0, 145.0),
        (-19.0, 147.0), (-23.0, 151.0), (-28.0, 153.0), (-33.0, 152.0), (-38.0, 148.0), (-39.0, 146.0),
        (-38.0, 141.0), (-35.0, 138.0), (-33.0, 134.0), (-32.0, 131.0), (-34.0, 124.0), (-35.0, 118.0),
        (-34.0, 115.0), (-29.0, 114.0), (-22.0, 114.0), (-20.0, 119.0), (-17.0, 122.0), (-14.0, 126.0),
        (-15.0, 129.0), (-12.0, 131.0), (-11.0, 132.0),
    ],
    // Greenland
    &[
        (60.0, -44.0), (65.0, -40.0), (70.0, -22.0), (76.0, -19.0), (81.0, -14.0), (83.0, -30.0),
        (82.0, -50.0), (79.0, -70.0), (76.0, -68.0), (74.0, -57.0), (70.0, -54.0), (66.0, -53.0),
        (62.0, -49.0), (60.0, -44.0),
    ],
    // Japan
    &[
        (31.0, 130.0), (34.0, 130.0), (35.0, 133.0), (36.0, 136.0), (38.0, 139.0), (41.0, 140.0),
        (43.0, 141.0), (45.0, 142.0), (43.0, 145.0), (42.0, 143.0), (40.0, 142.0), (37.0, 141.0),
        (35.0, 140.0), (34.0, 137.0), (33.0, 135.0), (33.0, 132.0), (31.0, 130.0),
    ],
    // Great Britain
    &[
        (50.0, -5.0), (51.0, 1.0), (53.0, 0.0), (55.0, -2.0), (58.0, -3.0), (58.0, -5.0),
        (56.0, -6.0), (54.0, -5.0), (53.0, -3.0), (51.0, -5.0), (50.0, -5.0),
    ],
    // Antarctica
    &[
        (-65.0, -60.0), (-70.0, -75.0), (-73.0, -100.0), (-75.0, -140.0), (-78.0, -165.0), (-77.0, 165.0),
        (-70.0, 160.0), (-67.0, 140.0), (-66.0, 110.0), (-67.0, 80.0), (-69.0, 70.0), (-67.0, 50.0),
        (-70.0, 20.0), (-70.0, 0.0), (-72.0, -15.0), (-75.0, -30.0), (-78.0, -40.0), (-73.0, -60.0),
        (-65.0, -60.0),
    ],
];

/// Longitude directly under the sun, degrees
pub fn solar_longitude(now: DateTime<Utc>) -> f64 {
    let hours = now.num_seconds_from_midnight() as f64 / 3600.0;
    normalize_longitude((12.0 - hours) * 15.0)
}

/// 1.0 in full daylight, 0.0 at night, linear across an 18° terminator band
pub fn daylight_level(solar_lon: f64, lon: f64) -> f64 {
    const DAY_EDGE: f64 = 90.0;
    const NIGHT_EDGE: f64 = 108.0;
    let delta = shortest_angular_delta(solar_lon, lon).abs();
    if delta < DAY_EDGE {
        1.0
    } else if delta > NIGHT_EDGE {
        0.0
    } else {
        1.0 - (delta - DAY_EDGE) / (NIGHT_EDGE - DAY_EDGE)
    }
}

/// Screen region in terminal cells
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Maps world space onto braille dots for one frame
pub struct Projector<'a> {
    camera: &'a Camera,
    cx: f64,
    cy: f64,
    radius: f64,
}

impl<'a> Projector<'a> {
    pub fn new(camera: &'a Camera, area: Area) -> Self {
        let (w, h) = (area.width as f64 * 2.0, area.height as f64 * 4.0);
        Self {
            camera,
            cx: area.x as f64 * 2.0 + w / 2.0,
            cy: area.y as f64 * 4.0 + h / 2.0,
            radius: w.min(h) * 0.42 * camera.zoom,
        }
    }

    /// Globe radius in dots
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    /// Dot coordinates of a world point, `None` when hidden behind the globe
    pub fn project(&self, world: Vec3) -> Option<(f64, f64)> {
        let v = self.camera.to_view(world);
        if !Camera::is_visible(v, GLOBE_RADIUS) {
            return None;
        }
        let scale = self.radius / GLOBE_RADIUS;
        Some((self.cx + v.x * scale, self.cy - v.y * scale))
    }

    /// Surface (lat, lon) under a dot, `None` off the disc
    pub fn unproject(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let nx = (px - self.cx) / self.radius;
        let ny = (self.cy - py) / self.radius;
        let d2 = nx * nx + ny * ny;
        if d2 > 1.0 {
            return None;
        }
        let nz = (1.0 - d2).sqrt();
        let view = Vec3::new(nx, ny, nz) * GLOBE_RADIUS;
        Some(vec3_to_lat_lon(self.camera.from_view(view)))
    }
}

struct Star {
    x: f64,
    y: f64,
    phase: f64,
}

pub struct GlobeRenderer {
    canvas: BrailleCanvas,
    stars: Vec<Star>,
    texture: Option<WorldTexture>,
    /// Cell under the focused marker, set by the last `draw`
    focus_anchor: Option<(i32, i32)>,
}

impl GlobeRenderer {
    pub fn new<R: Rng>(cols: u16, rows: u16, texture: Option<WorldTexture>, rng: &mut R) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.gen(),
                y: rng.gen(),
                phase: rng.gen_range(0.0..std::f64::consts::TAU),
            })
            .collect();
        Self {
            canvas: BrailleCanvas::new(cols, rows),
            stars,
            texture,
            focus_anchor: None,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas.resize(cols, rows);
    }

    pub fn focus_anchor(&self) -> Option<(i32, i32)> {
        self.focus_anchor
    }

    pub fn draw(&mut self, d: &Dashboard, area: Area, t: f64, solar_lon: f64) {
        self.canvas.clear();
        self.focus_anchor = None;
        let proj = Projector::new(&d.camera, area);

        self.draw_stars(&proj, area, t);
        self.draw_surface(&proj, d, area, solar_lon);
        self.draw_atmosphere(&proj);
        self.draw_graticule(&proj, solar_lon);
        self.draw_coastlines(&proj, solar_lon);

        if d.view == ViewMode::Topology {
            self.draw_topology(&proj, d);
        }
        self.draw_links(&proj, d, t);
        for p in d.particles.particles() {
            if let Some((x, y)) = proj.project(p.position()) {
                self.canvas.disc(x, y, p.current_size() / 4.0, flow_color(p.color), Layer::Particle);
            }
        }
        self.draw_markers(&proj, d, t);
    }

    pub fn render(&self, term: &mut Terminal) {
        self.canvas.render(term);
    }

    fn draw_stars(&mut self, proj: &Projector, area: Area, t: f64) {
        let (cx, cy) = proj.center();
        let halo = proj.radius() * 1.08;
        let (w, h) = (area.width as f64 * 2.0, area.height as f64 * 4.0);
        for star in &self.stars {
            let x = area.x as f64 * 2.0 + star.x * w;
            let y = area.y as f64 * 4.0 + star.y * h;
            if (x - cx).hypot(y - cy) < halo {
                continue;
            }
            let twinkle = ((t * 1.3 + star.phase).sin() + 1.0) / 2.0;
            if twinkle > 0.3 {
                let level = (90.0 + twinkle * 140.0) as u8;
                self.canvas.plot_f(x, y, rgb(level, level, level), Layer::Star);
            }
        }
    }

    /// Per-cell background: world texture and/or heatmap colours
    fn draw_surface(&mut self, proj: &Projector, d: &Dashboard, area: Area, solar_lon: f64) {
        let heat = d.view == ViewMode::Heatmap;
        if !heat && self.texture.is_none() {
            return;
        }
        for row in area.y..area.y + area.height {
            for col in area.x..area.x + area.width {
                let (px, py) = (col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0);
                let Some((lat, lon)) = proj.unproject(px, py) else {
                    continue;
                };
                let light = 0.35 + 0.65 * daylight_level(solar_lon, lon);
                let mut base = match &self.texture {
                    Some(tex) => {
                        let [r, g, b] = tex.sample(lat, lon);
                        [r as f64 * light, g as f64 * light, b as f64 * light]
                    }
                    None => OCEAN,
                };
                if heat {
                    if let Some([r, g, b, a]) = d.heatmap.sample(lat, lon) {
                        let alpha = a as f64 / 255.0;
                        for (c, v) in base.iter_mut().zip([r, g, b]) {
                            *c = *c * (1.0 - alpha) + v as f64 * alpha;
                        }
                    }
                }
                self.canvas.set_background(col as usize, row as usize, rgb(base[0] as u8, base[1] as u8, base[2] as u8));
            }
        }
    }

    fn draw_atmosphere(&mut self, proj: &Projector) {
        let (cx, cy) = proj.center();
        for (scale, strength) in [(1.03, 1.0), (1.07, 0.5)] {
            let r = proj.radius() * scale;
            let steps = (r * std::f64::consts::TAU).ceil().max(16.0) as usize;
            for i in 0..steps {
                let a = i as f64 / steps as f64 * std::f64::consts::TAU;
                self.canvas.plot_f(cx + r * a.cos(), cy + r * a.sin(), dim(palette::ATMOSPHERE, strength), Layer::Atmosphere);
            }
        }
    }

    fn draw_graticule(&mut self, proj: &Projector, solar_lon: f64) {
        let plot = |canvas: &mut BrailleCanvas, lat: f64, lon: f64| {
            if let Some((x, y)) = proj.project(lat_lon_to_vec3(lat, lon, GLOBE_RADIUS)) {
                let light = 0.35 + 0.65 * daylight_level(solar_lon, lon);
                canvas.plot_f(x, y, dim(palette::GRATICULE, light), Layer::Graticule);
            }
        };
        for lat in (-60..=60).step_by(30) {
            for lon in -180..180 {
                plot(&mut self.canvas, lat as f64, lon as f64);
            }
        }
        for lon in (-180..180).step_by(30) {
            for lat in -90..=90 {
                plot(&mut self.canvas, lat as f64, lon as f64);
            }
        }
    }

    fn draw_coastlines(&mut self, proj: &Projector, solar_lon: f64) {
        const STEPS: usize = 12;
        for line in COASTLINES {
            for pair in line.windows(2) {
                let ((lat1, lon1), (lat2, lon2)) = (pair[0], pair[1]);
                let dlon = shortest_angular_delta(lon1, lon2);
                for s in 0..STEPS {
                    let f = s as f64 / STEPS as f64;
                    let lat = lat1 + (lat2 - lat1) * f;
                    let lon = normalize_longitude(lon1 + dlon * f);
                    if let Some((x, y)) = proj.project(lat_lon_to_vec3(lat, lon, GLOBE_RADIUS)) {
                        let color = if daylight_level(solar_lon, lon) > 0.5 {
                            palette::COASTLINE
                        } else {
                            palette::COASTLINE_NIGHT
                        };
                        self.canvas.plot_f(x, y, color, Layer::Coastline);
                    }
                }
            }
        }
    }

    fn draw_topology(&mut self, proj: &Projector, d: &Dashboard) {
        for link in topology::links(&d.providers) {
            let (start, end) = (link.from.position().to_world(), link.to.position().to_world());
            let (points, color) = match link.kind {
                LinkKind::Hosting => (sample_arc(start, end, 8), dim(provider_color(link.provider), 0.8)),
                LinkKind::Backbone => (sample_arc(start, end, ARC_SEGMENTS), dim(provider_color(link.provider), 0.6)),
                LinkKind::Peer => (
                    (0..=ARC_SEGMENTS).map(|i| start.lerp(end, i as f64 / ARC_SEGMENTS as f64)).collect(),
                    dim(palette::TOPOLOGY, 0.3),
                ),
            };
            self.polyline(proj, &points, color, Layer::Topology, link.is_dashed());
        }
    }

    fn draw_links(&mut self, proj: &Projector, d: &Dashboard, t: f64) {
        let pulse = ((t * 5.0).sin() + 1.0) / 2.0;
        let selected = d.selected_link();
        for reading in d.visible_links() {
            let Some((start, end)) = link_endpoints(reading) else {
                continue;
            };
            let points = sample_arc(start, end, ARC_SEGMENTS);
            let color = band_color(reading.band());
            if selected == Some(reading) {
                self.polyline(proj, &points, color, Layer::Selected, false);
            } else {
                self.polyline(proj, &points, dim(color, 0.3 + 0.7 * pulse), Layer::Arc, false);
            }
        }
    }

    fn draw_markers(&mut self, proj: &Projector, d: &Dashboard, t: f64) {
        let focused = d.focus.map(|f| f.location.id());
        for loc in d.visible_locations() {
            let Some((x, y)) = proj.project(loc.position().to_world()) else {
                continue;
            };
            if focused == Some(loc.id()) {
                let r = 3.0 + (t * 5.0).sin();
                self.canvas.disc(x, y, r, palette::SELECTED, Layer::Selected);
                self.focus_anchor = Some(((x / 2.0) as i32, (y / 4.0) as i32));
                continue;
            }
            let (radius, color) = match loc {
                Location::Exchange(_) => (1.5, hex_color(loc.color_hex())),
                Location::Region(_) => (1.0, dim(hex_color(loc.color_hex()), 0.8)),
            };
            self.canvas.disc(x, y, radius, color, Layer::Marker);
        }
    }

    fn polyline(&mut self, proj: &Projector, points: &[Vec3], color: Color, layer: Layer, dashed: bool) {
        let projected: Vec<Option<(f64, f64)>> = points.iter().map(|p| proj.project(*p)).collect();
        for pair in projected.windows(2) {
            match (pair[0], pair[1]) {
                (Some(a), Some(b)) if dashed => self.canvas.dashed_line(a, b, color, layer, (2, 2)),
                (Some(a), Some(b)) => self.canvas.line(a, b, color, layer),
                (Some(a), None) | (None, Some(a)) => self.canvas.plot_f(a.0, a.1, color, layer),
                (None, None) => {}
            }
        }
    }
}

/// Globe viewport: right of the side panel, between header and status line
pub fn globe_area(width: u16, height: u16, show_panel: bool) -> Area {
    let left = if show_panel && width > panels::PANEL_WIDTH + 20 { panels::PANEL_WIDTH } else { 0 };
    Area {
        x: left,
        y: panels::HEADER_HEIGHT,
        width: width - left,
        height: height.saturating_sub(panels::HEADER_HEIGHT + 1),
    }
}

fn draw_frame(term: &mut Terminal, renderer: &mut GlobeRenderer, d: &Dashboard, t: f64) {
    let (width, height) = term.size();
    let area = globe_area(width, height, d.show_panel);

    term.clear();
    renderer.draw(d, area, t, solar_longitude(Utc::now()));
    renderer.render(term);

    if area.x > 0 {
        panels::render_side_panel(term, d, t);
    }
    panels::render_header(term, d, area.x as i32);
    panels::render_status_line(term, d, area.x as i32);

    if let (Some(focus), Some((x, y))) = (d.focus, renderer.focus_anchor()) {
        panels::render_tooltip(term, &focus.location, x + 2, y - 2);
    }
    if let Some(view) = &d.history {
        chart::render_history(term, view);
    }
    if d.show_help {
        render_help_overlay(term, HELP);
    }
}

/// Run the interactive dashboard until the user quits
pub fn run(config: &DashboardConfig) -> Result<()> {
    let texture = config.world_map.as_deref().and_then(WorldTexture::load);
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let source = Box::new(SyntheticSource::new(config.seed));

    let start = Instant::now();
    let mut dashboard = Dashboard::new(config, source, start);
    let mut term = Terminal::new()?;
    let (w, h) = term.size();
    let mut renderer = GlobeRenderer::new(w, h, texture, &mut rng);
    let mut last_frame = start;

    info!(
        refresh_ms = config.refresh_interval.as_millis() as u64,
        view = config.view.label(),
        providers = ?config.providers.active(),
        "dashboard started"
    );

    loop {
        let (width, height) = crossterm::terminal::size().unwrap_or(term.size());
        if (width, height) != term.size() {
            term.resize(width, height);
            term.clear_screen()?;
            renderer.resize(width, height);
        }

        let now = Instant::now();
        while let Some((code, mods)) = term.check_key()? {
            if dashboard.handle_key(code, mods, now) {
                info!("dashboard closed");
                return Ok(());
            }
        }

        dashboard.tick(now);
        let dt = now.duration_since(last_frame).as_secs_f64().min(0.25);
        last_frame = now;
        dashboard.frame(dt);

        draw_frame(&mut term, &mut renderer, &dashboard, now.duration_since(start).as_secs_f64());
        term.present()?;
        term.sleep(config.time_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn area() -> Area {
        Area { x: 0, y: 0, width: 80, height: 40 }
    }

    #[test]
    fn centre_of_view_projects_to_screen_centre() {
        let camera = Camera::new(0.0, 0.0);
        let proj = Projector::new(&camera, area());
        let (x, y) = proj.project(lat_lon_to_vec3(0.0, 0.0, GLOBE_RADIUS)).unwrap();
        assert!((x - 80.0).abs() < 1e-6 && (y - 80.0).abs() < 1e-6);

        let (lat, lon) = proj.unproject(80.0, 80.0).unwrap();
        assert!(lat.abs() < 1e-6 && lon.abs() < 1e-6);
    }

    #[test]
    fn far_side_is_hidden() {
        let camera = Camera::new(0.0, 0.0);
        let proj = Projector::new(&camera, area());
        assert!(proj.project(lat_lon_to_vec3(0.0, 180.0, GLOBE_RADIUS)).is_none());
        assert!(proj.project(lat_lon_to_vec3(10.0, 30.0, GLOBE_RADIUS)).is_some());
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let camera = Camera::new(0.0, 0.0);
        let proj = Projector::new(&camera, area());
        let (_, y_north) = proj.project(lat_lon_to_vec3(30.0, 0.0, GLOBE_RADIUS)).unwrap();
        let (x_east, _) = proj.project(lat_lon_to_vec3(0.0, 30.0, GLOBE_RADIUS)).unwrap();
        assert!(y_north < 80.0);
        assert!(x_east > 80.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let camera = Camera::new(25.0, 100.0);
        let proj = Projector::new(&camera, area());
        let (x, y) = proj.project(lat_lon_to_vec3(35.0, 120.0, GLOBE_RADIUS)).unwrap();
        let (lat, lon) = proj.unproject(x, y).unwrap();
        assert!((lat - 35.0).abs() < 1e-6 && (lon - 120.0).abs() < 1e-6);
        assert!(proj.unproject(0.0, 0.0).is_none());
    }

    #[test]
    fn sun_position_and_daylight() {
        let noon = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(solar_longitude(noon).abs() < 1e-9);
        let six = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        assert!((solar_longitude(six) - 90.0).abs() < 1e-9);

        assert_eq!(daylight_level(0.0, 45.0), 1.0);
        assert_eq!(daylight_level(0.0, 180.0), 0.0);
        assert!((daylight_level(0.0, 99.0) - 0.5).abs() < 1e-9);
        assert_eq!(daylight_level(170.0, -170.0), 1.0);
    }

    #[test]
    fn area_leaves_room_for_chrome() {
        let a = globe_area(120, 40, true);
        assert_eq!(a, Area { x: panels::PANEL_WIDTH, y: 2, width: 120 - panels::PANEL_WIDTH, height: 37 });
        assert_eq!(globe_area(120, 40, false).x, 0);
        assert_eq!(globe_area(40, 20, true).x, 0);
    }

    #[test]
    fn coastlines_are_valid_coordinates() {
        for line in COASTLINES {
            assert!(line.len() >= 2);
            assert!(line.iter().all(|(lat, lon)| lat.abs() <= 90.0 && lon.abs() <= 180.0));
        }
    }
}
