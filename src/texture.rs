//! Optional equirectangular world map used to tint the globe surface

use image::RgbImage;
use std::path::Path;
use tracing::{info, warn};

pub struct WorldTexture {
    image: RgbImage,
}

impl WorldTexture {
    /// Load failures are logged and yield `None`; the globe then draws outlines only
    pub fn load(path: &Path) -> Option<Self> {
        match image::open(path) {
            Ok(img) => {
                let image = img.to_rgb8();
                info!(path = %path.display(), width = image.width(), height = image.height(), "loaded world texture");
                Some(Self::from_image(image))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "world texture unavailable, using outline globe");
                None
            }
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Nearest texel for a coordinate; row 0 is the north edge
    pub fn sample(&self, lat: f64, lon: f64) -> [u8; 3] {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return [0, 0, 0];
        }
        let u = ((lon + 180.0) / 360.0).rem_euclid(1.0);
        let v = ((90.0 - lat) / 180.0).clamp(0.0, 1.0);
        let x = ((u * w as f64) as u32).min(w - 1);
        let y = ((v * h as f64) as u32).min(h - 1);
        self.image.get_pixel(x, y).0
    }
}
