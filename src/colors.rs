use crossterm::style::Color;

use crate::data::{LatencyBand, Provider};
use crate::particles::FlowColor;

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Parse `#RRGGBB`; anything malformed renders white
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Color::White;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => rgb(r, g, b),
        _ => Color::White,
    }
}

/// Scale an RGB colour towards black; named colours pass through
pub fn dim(color: Color, factor: f64) -> Color {
    match color {
        Color::Rgb { r, g, b } => {
            let f = factor.clamp(0.0, 1.0);
            rgb((r as f64 * f) as u8, (g as f64 * f) as u8, (b as f64 * f) as u8)
        }
        other => other,
    }
}

pub fn band_color(band: LatencyBand) -> Color {
    hex_color(band.color_hex())
}

pub fn provider_color(provider: Provider) -> Color {
    hex_color(provider.color_hex())
}

pub fn flow_color(color: FlowColor) -> Color {
    match color {
        FlowColor::Green => rgb(0, 255, 102),
        FlowColor::Yellow => rgb(255, 153, 0),
        FlowColor::Red => rgb(255, 0, 0),
    }
}

/// Panel chrome
pub mod palette {
    use crossterm::style::Color;

    pub const BORDER: Color = Color::DarkGrey;
    pub const TITLE: Color = Color::White;
    pub const TEXT: Color = Color::Grey;
    pub const MUTED: Color = Color::DarkGrey;
    pub const ACCENT: Color = Color::Cyan;
    pub const SELECTED: Color = Color::Rgb { r: 0, g: 255, b: 136 };
    pub const GRATICULE: Color = Color::Rgb { r: 40, g: 70, b: 90 };
    pub const COASTLINE: Color = Color::Rgb { r: 70, g: 150, b: 170 };
    pub const COASTLINE_NIGHT: Color = Color::Rgb { r: 35, g: 75, b: 90 };
    pub const ATMOSPHERE: Color = Color::Rgb { r: 30, g: 90, b: 160 };
    /// Exchange peer lines, `#666666`
    pub const TOPOLOGY: Color = Color::Rgb { r: 102, g: 102, b: 102 };
}

/// Semantic colours for metric cards
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Good,
    Warning,
    Critical,
    Info,
}

impl StatusColor {
    pub fn color(&self) -> Color {
        match self {
            StatusColor::Good => Color::Green,
            StatusColor::Warning => Color::Yellow,
            StatusColor::Critical => Color::Red,
            StatusColor::Info => Color::Cyan,
        }
    }

    /// Gauge colour for a 0-100 fill
    pub fn for_percent(percent: f64) -> Self {
        if percent < 50.0 {
            StatusColor::Good
        } else if percent < 75.0 {
            StatusColor::Warning
        } else {
            StatusColor::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        assert_eq!(hex_color("#FF9900"), rgb(255, 153, 0));
        assert_eq!(hex_color("00ff88"), rgb(0, 255, 136));
        assert_eq!(hex_color("#zzzzzz"), Color::White);
        assert_eq!(hex_color("#fff"), Color::White);
    }

    #[test]
    fn band_colors_follow_thresholds() {
        assert_eq!(band_color(LatencyBand::of(10.0)), rgb(0, 255, 136));
        assert_eq!(band_color(LatencyBand::of(75.0)), rgb(255, 255, 0));
        assert_eq!(band_color(LatencyBand::of(120.0)), rgb(255, 153, 0));
        assert_eq!(band_color(LatencyBand::of(180.0)), rgb(255, 0, 0));
    }

    #[test]
    fn dimming() {
        assert_eq!(dim(rgb(200, 100, 50), 0.5), rgb(100, 50, 25));
        assert_eq!(dim(Color::Red, 0.5), Color::Red);
    }

    #[test]
    fn gauge_status() {
        assert_eq!(StatusColor::for_percent(10.0), StatusColor::Good);
        assert_eq!(StatusColor::for_percent(60.0), StatusColor::Warning);
        assert_eq!(StatusColor::for_percent(100.0), StatusColor::Critical);
    }
}
