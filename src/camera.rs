//! Orbit camera around the globe.
//!
//! The camera is owned by the dashboard and handed to the renderer by
//! reference; search focus drives it through [`Camera::fly_to`].

use crate::geo::{normalize_longitude, shortest_angular_delta, Vec3};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
const MAX_TILT: f64 = 85.0;

/// Fraction of the remaining distance covered per frame while focusing
const FOCUS_LERP: f64 = 0.05;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Latitude at the centre of the view, degrees
    pub center_lat: f64,
    /// Longitude at the centre of the view, degrees
    pub center_lon: f64,
    pub zoom: f64,
    /// Degrees per second of idle spin
    pub auto_rotate: f64,
    target: Option<(f64, f64)>,
    home: (f64, f64),
}

impl Camera {
    pub fn new(center_lat: f64, center_lon: f64) -> Self {
        let center_lat = center_lat.clamp(-MAX_TILT, MAX_TILT);
        let center_lon = normalize_longitude(center_lon);
        Self {
            center_lat,
            center_lon,
            zoom: 1.0,
            auto_rotate: 0.0,
            target: None,
            home: (center_lat, center_lon),
        }
    }

    pub fn rotate(&mut self, dlon: f64) {
        self.center_lon = normalize_longitude(self.center_lon + dlon);
    }

    pub fn tilt(&mut self, dlat: f64) {
        self.center_lat = (self.center_lat + dlat).clamp(-MAX_TILT, MAX_TILT);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.2).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.2).max(MIN_ZOOM);
    }

    pub fn reset(&mut self) {
        self.center_lat = self.home.0;
        self.center_lon = self.home.1;
        self.zoom = 1.0;
        self.target = None;
    }

    pub fn fly_to(&mut self, lat: f64, lon: f64) {
        self.target = Some((lat.clamp(-MAX_TILT, MAX_TILT), normalize_longitude(lon)));
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    #[cfg(test)]
    pub fn target(&self) -> Option<(f64, f64)> {
        self.target
    }

    /// Per-frame update: approach the focus target, otherwise idle spin
    pub fn update(&mut self, dt: f64) {
        match self.target {
            Some((lat, lon)) => {
                self.center_lat += (lat - self.center_lat) * FOCUS_LERP;
                self.center_lon = normalize_longitude(self.center_lon + shortest_angular_delta(self.center_lon, lon) * FOCUS_LERP);
            }
            None if self.auto_rotate != 0.0 => self.rotate(self.auto_rotate * dt),
            None => {}
        }
    }

    /// World → view space. The view looks down -Z, so +Z faces the viewer.
    pub fn to_view(&self, v: Vec3) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw().sin_cos();
        let (sin_tilt, cos_tilt) = self.center_lat.to_radians().sin_cos();

        let x1 = v.x * cos_yaw + v.z * sin_yaw;
        let z1 = v.z * cos_yaw - v.x * sin_yaw;

        Vec3 {
            x: x1,
            y: v.y * cos_tilt - z1 * sin_tilt,
            z: v.y * sin_tilt + z1 * cos_tilt,
        }
    }

    /// View → world space
    pub fn from_view(&self, v: Vec3) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw().sin_cos();
        let (sin_tilt, cos_tilt) = self.center_lat.to_radians().sin_cos();

        let y1 = v.y * cos_tilt + v.z * sin_tilt;
        let z1 = v.z * cos_tilt - v.y * sin_tilt;

        Vec3 {
            x: v.x * cos_yaw - z1 * sin_yaw,
            y: y1,
            z: v.x * sin_yaw + z1 * cos_yaw,
        }
    }

    /// A view-space point is hidden only when it is behind the globe disc
    pub fn is_visible(view: Vec3, globe_radius: f64) -> bool {
        view.z >= 0.0 || view.x * view.x + view.y * view.y > globe_radius * globe_radius
    }

    fn yaw(&self) -> f64 {
        -(self.center_lon + 90.0).to_radians()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(20.0, 0.0)
    }
}
