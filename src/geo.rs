//! Sphere geometry: lat/lon projection, arcs and angle helpers.
//!
//! World space follows the usual scene convention: +Y is the north pole,
//! latitude 0 / longitude -90 faces +Z.

use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalize(&self) -> Vec3 {
        let len = self.length();
        if len <= f64::EPSILON {
            return Vec3::ZERO;
        }
        *self * (1.0 / len)
    }

    pub fn lerp(&self, other: Vec3, t: f64) -> Vec3 {
        *self + (other - *self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

/// World-space radius of the globe
pub const GLOBE_RADIUS: f64 = 5.0;

/// Spherical to Cartesian, angles in degrees
pub fn lat_lon_to_vec3(lat: f64, lon: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();

    Vec3 {
        x: -(radius * phi.sin() * theta.cos()),
        y: radius * phi.cos(),
        z: radius * phi.sin() * theta.sin(),
    }
}

/// Marker position: the surface point pushed outward by `elevation`
pub fn position_with_elevation(lat: f64, lon: f64, elevation: f64, radius: f64) -> Vec3 {
    lat_lon_to_vec3(lat, lon, radius).normalize() * (radius + elevation)
}

/// Inverse of [`lat_lon_to_vec3`], returns (lat, lon) in degrees
pub fn vec3_to_lat_lon(v: Vec3) -> (f64, f64) {
    let r = v.length();
    if r <= f64::EPSILON {
        return (0.0, 0.0);
    }
    let phi = (v.y / r).clamp(-1.0, 1.0).acos();
    let theta = v.z.atan2(-v.x);
    let lat = 90.0 - phi.to_degrees();
    let lon = normalize_longitude(theta.to_degrees() - 180.0);
    (lat, lon)
}

/// Apex of the arc between two surface points, lifted 20% above `start`
pub fn arc_control_point(start: Vec3, end: Vec3) -> Vec3 {
    let mid = (start + end) * 0.5;
    let dir = if mid.length() <= 1e-9 { Vec3::UP } else { mid.normalize() };
    dir * (start.length() * 1.2)
}

pub fn quadratic_bezier(a: Vec3, control: Vec3, b: Vec3, t: f64) -> Vec3 {
    let u = 1.0 - t;
    a * (u * u) + control * (2.0 * u * t) + b * (t * t)
}

/// Evenly spaced points along the arc, endpoints included
pub fn sample_arc(start: Vec3, end: Vec3, segments: usize) -> Vec<Vec3> {
    let control = arc_control_point(start, end);
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| quadratic_bezier(start, control, end, i as f64 / segments as f64))
        .collect()
}

/// Shortest signed delta from `from` to `to` in degrees, in -180..=180
pub fn shortest_angular_delta(from: f64, to: f64) -> f64 {
    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Wrap a longitude into -180..=180
pub fn normalize_longitude(lon: f64) -> f64 {
    let normalized = lon.rem_euclid(360.0);
    if normalized > 180.0 {
        normalized - 360.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn projection_stays_on_sphere() {
        for lat in (-90..=90).step_by(15) {
            for lon in (-180..=180).step_by(20) {
                let v = lat_lon_to_vec3(lat as f64, lon as f64, 5.0);
                assert!(close(v.length(), 5.0), "lat {lat} lon {lon} -> {}", v.length());
            }
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let a = lat_lon_to_vec3(35.6762, 139.6503, 5.0);
        let b = lat_lon_to_vec3(35.6762, 139.6503, 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn known_points() {
        let north = lat_lon_to_vec3(90.0, 0.0, 2.0);
        assert!(close(north.y, 2.0));

        let greenwich = lat_lon_to_vec3(0.0, 0.0, 1.0);
        assert!(close(greenwich.x, 1.0) && close(greenwich.y, 0.0) && greenwich.z.abs() < 1e-9);

        let facing = lat_lon_to_vec3(0.0, -90.0, 1.0);
        assert!(close(facing.z, 1.0));
    }

    #[test]
    fn elevation_extends_radius() {
        let v = position_with_elevation(52.3676, 4.9041, 0.1, 5.0);
        assert!(close(v.length(), 5.1));
        let surface = lat_lon_to_vec3(52.3676, 4.9041, 5.0).normalize();
        assert!(close(v.normalize().x, surface.x));
    }

    #[test]
    fn inverse_projection_recovers_coordinates() {
        let (lat, lon) = vec3_to_lat_lon(lat_lon_to_vec3(-33.9, 151.2, 5.0));
        assert!((lat + 33.9).abs() < 1e-6);
        assert!((lon - 151.2).abs() < 1e-6);
    }

    #[test]
    fn arc_apex_is_lifted() {
        let a = lat_lon_to_vec3(0.0, 0.0, 5.0);
        let b = lat_lon_to_vec3(0.0, 60.0, 5.0);
        let apex = arc_control_point(a, b);
        assert!(close(apex.length(), 6.0));

        let points = sample_arc(a, b, 10);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0], a);
        assert!(close(points[10].x, b.x) && close(points[10].z, b.z));
        assert!(points[5].length() > 5.0);
    }

    #[test]
    fn antipodal_arc_uses_up_vector() {
        let a = lat_lon_to_vec3(0.0, 0.0, 5.0);
        let b = lat_lon_to_vec3(0.0, 180.0, 5.0);
        let apex = arc_control_point(a, b);
        assert!(close(apex.y, 6.0));
    }

    #[test]
    fn angle_helpers() {
        assert!(close(shortest_angular_delta(170.0, -170.0), 20.0));
        assert!(close(shortest_angular_delta(-170.0, 170.0), -20.0));
        assert!(close(shortest_angular_delta(10.0, 30.0), 20.0));
        assert!(close(normalize_longitude(190.0), -170.0));
        assert!(close(normalize_longitude(-190.0), 170.0));
        assert!(close(normalize_longitude(45.0), 45.0));
    }
}
