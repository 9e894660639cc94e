//! Latency heatmap: splat readings onto an equirectangular intensity grid,
//! then colour it through a 256-entry lookup table.

use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::data::LatencyReading;
use crate::error::Result;

pub const DEFAULT_SIZE: usize = 512;
/// Largest texture edge accepted from the command line
pub const MAX_SIZE: usize = 4096;

/// Latency at which a splat reaches full intensity
const SATURATION_LATENCY_MS: f64 = 150.0;

pub struct Heatmap {
    size: usize,
    intensity: Vec<u8>,
    lut: ColorLut,
}

impl Heatmap {
    pub fn new(size: usize) -> Self {
        let size = size.clamp(8, MAX_SIZE);
        Self {
            size,
            intensity: vec![0; size * size],
            lut: ColorLut::new(),
        }
    }

    /// Rebuild the whole field from `readings`
    pub fn rebuild(&mut self, readings: &[LatencyReading]) {
        self.intensity.iter_mut().for_each(|p| *p = 0);
        for reading in readings {
            let (lat, lon) = reading.position.unwrap_or((0.0, 0.0));
            self.splat(lat, lon, reading.latency);
        }
        debug!(readings = readings.len(), size = self.size, "heatmap rebuilt");
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn splat_radius(&self) -> f64 {
        self.size as f64 / 8.0
    }

    /// Grid cell for a coordinate; row 0 is the south pole
    pub fn grid_position(&self, lat: f64, lon: f64) -> (i64, i64) {
        let u = (lon + 180.0) / 360.0;
        let v = (lat + 90.0) / 180.0;
        ((u * self.size as f64).floor() as i64, (v * self.size as f64).floor() as i64)
    }

    fn splat(&mut self, lat: f64, lon: f64, latency: f64) {
        let (cx, cy) = self.grid_position(lat, lon);
        let radius = self.splat_radius();
        let radius_sq = radius * radius;
        let reach = radius.ceil() as i64;
        let base = (latency / SATURATION_LATENCY_MS).clamp(0.0, 1.0) * 255.0;
        let min_intensity = 0.2 * base;
        let last = self.size as i64 - 1;

        for py in (cy - reach).max(0)..=(cy + reach).min(last) {
            let dy = (py - cy) as f64;
            for px in (cx - reach).max(0)..=(cx + reach).min(last) {
                let dx = (px - cx) as f64;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq > radius_sq {
                    continue;
                }
                let falloff = (1.0 - dist_sq.sqrt() / radius).powf(1.5);
                let value = (min_intensity + falloff * base * 0.8).round().min(255.0) as u8;
                let idx = py as usize * self.size + px as usize;
                self.intensity[idx] = self.intensity[idx].max(value);
            }
        }
    }

    pub fn intensity_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.size || y >= self.size {
            return 0;
        }
        self.intensity[y * self.size + x]
    }

    /// RGBA at a coordinate, `None` where nothing was splatted
    pub fn sample(&self, lat: f64, lon: f64) -> Option<[u8; 4]> {
        let (x, y) = self.grid_position(lat.clamp(-90.0, 89.999), crate::geo::normalize_longitude(lon));
        let x = x.clamp(0, self.size as i64 - 1) as usize;
        let y = y.clamp(0, self.size as i64 - 1) as usize;
        match self.intensity_at(x, y) {
            0 => None,
            i => Some(self.lut.get(i)),
        }
    }

    /// The coloured texture with north at the top
    pub fn to_image(&self) -> RgbaImage {
        let n = self.size as u32;
        let mut img = RgbaImage::new(n, n);
        for y in 0..self.size {
            let row = (self.size - 1 - y) as u32;
            for x in 0..self.size {
                let rgba = match self.intensity_at(x, y) {
                    0 => [0, 0, 0, 0],
                    i => self.lut.get(i),
                };
                img.put_pixel(x as u32, row, Rgba(rgba));
            }
        }
        img
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }
}

/// Intensity → RGBA, red-orange ramp
pub struct ColorLut {
    table: [[u8; 4]; 256],
}

impl ColorLut {
    pub fn new() -> Self {
        let mut table = [[0u8; 4]; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let n = i as f64 / 255.0;
            let hue = (1.0 - n) * 30.0 / 360.0;
            let lightness = 0.4 + 0.2 * (1.0 - n);
            let (r, g, b) = hsl_to_rgb(hue, 0.9, lightness);
            let alpha = (50.0 + i as f64 * 1.5).min(255.0) as u8;
            *entry = [r, g, b, alpha];
        }
        Self { table }
    }

    pub fn get(&self, intensity: u8) -> [u8; 4] {
        self.table[intensity as usize]
    }
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::new()
    }
}

/// HSL (all components in 0..=1) to 8-bit RGB
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let hue_to_rgb = |p: f64, q: f64, mut t: f64| -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    ((r * 255.0).round() as u8, (g * 255.0).round() as u8, (b * 255.0).round() as u8)
}
