//! Static exchange/region catalogue and synthetic latency readings

use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::geo::{normalize_longitude, position_with_elevation, shortest_angular_delta, Vec3, GLOBE_RADIUS};

// ============================================================================
// Provider
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
pub enum Provider {
    #[serde(rename = "AWS", alias = "aws")]
    Aws,
    #[serde(rename = "GCP", alias = "gcp")]
    Gcp,
    #[serde(rename = "Azure", alias = "azure")]
    Azure,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Gcp => "GCP",
            Provider::Azure => "Azure",
        }
    }

    /// Brand colour used for region markers and topology links
    pub fn color_hex(&self) -> &'static str {
        match self {
            Provider::Aws => "#FF9900",
            Provider::Gcp => "#4285F4",
            Provider::Azure => "#0089D6",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" | "amazon" => Ok(Provider::Aws),
            "gcp" | "google" => Ok(Provider::Gcp),
            "azure" | "microsoft" => Ok(Provider::Azure),
            _ => Err(Error::InvalidArgument { name: "provider", value: s.to_string() }),
        }
    }
}

// ============================================================================
// Catalogue
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

const fn pos(lat: f64, lon: f64, elevation: f64) -> GeoPosition {
    GeoPosition { lat, lon, elevation }
}

impl GeoPosition {
    /// Scene position on the globe, lifted by the elevation
    pub fn to_world(&self) -> Vec3 {
        position_with_elevation(self.lat, self.lon, self.elevation, GLOBE_RADIUS)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub id: &'static str,
    pub name: &'static str,
    pub position: GeoPosition,
    pub provider: Provider,
    pub region: &'static str,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CloudRegion {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    pub position: GeoPosition,
    pub code: &'static str,
    pub server_count: u32,
}

pub const EXCHANGES: &[Exchange] = &[
    Exchange { id: "binance-tokyo", name: "Binance", position: pos(35.6762, 139.6503, 0.1), provider: Provider::Aws, region: "ap-northeast-1", color: "#F3BA2F" },
    Exchange { id: "okx-singapore", name: "OKX", position: pos(1.3521, 103.8198, 0.1), provider: Provider::Aws, region: "ap-southeast-1", color: "#00D092" },
    Exchange { id: "deribit-amsterdam", name: "Deribit", position: pos(52.3676, 4.9041, 0.1), provider: Provider::Gcp, region: "europe-west4", color: "#2962FF" },
    Exchange { id: "bybit-hongkong", name: "Bybit", position: pos(22.3193, 114.1694, 0.1), provider: Provider::Azure, region: "eastasia", color: "#F7A600" },
    Exchange { id: "coinbase-us-east", name: "Coinbase", position: pos(37.7749, -122.4194, 0.1), provider: Provider::Aws, region: "us-west-1", color: "#0052FF" },
    Exchange { id: "kraken-us-west", name: "Kraken", position: pos(47.6062, -122.3321, 0.1), provider: Provider::Gcp, region: "us-west1", color: "#5741D9" },
    Exchange { id: "bitfinex-london", name: "Bitfinex", position: pos(51.5074, -0.1278, 0.1), provider: Provider::Azure, region: "uksouth", color: "#16B157" },
    Exchange { id: "huobi-seoul", name: "Huobi", position: pos(37.5665, 126.9780, 0.1), provider: Provider::Aws, region: "ap-northeast-2", color: "#2BA8E0" },
];

pub const CLOUD_REGIONS: &[CloudRegion] = &[
    CloudRegion { id: "aws-tokyo", name: "AWS Tokyo", provider: Provider::Aws, position: pos(35.6762, 139.6503, 0.05), code: "ap-northeast-1", server_count: 15 },
    CloudRegion { id: "aws-singapore", name: "AWS Singapore", provider: Provider::Aws, position: pos(1.3521, 103.8198, 0.05), code: "ap-southeast-1", server_count: 12 },
    CloudRegion { id: "gcp-amsterdam", name: "GCP Amsterdam", provider: Provider::Gcp, position: pos(52.3676, 4.9041, 0.05), code: "europe-west4", server_count: 10 },
    CloudRegion { id: "azure-hongkong", name: "Azure Hong Kong", provider: Provider::Azure, position: pos(22.3193, 114.1694, 0.05), code: "eastasia", server_count: 8 },
    CloudRegion { id: "aws-us-west", name: "AWS US West", provider: Provider::Aws, position: pos(37.7749, -122.4194, 0.05), code: "us-west-1", server_count: 20 },
    CloudRegion { id: "gcp-us-west", name: "GCP US West", provider: Provider::Gcp, position: pos(45.5231, -122.6765, 0.05), code: "us-west1", server_count: 18 },
    CloudRegion { id: "azure-uk-south", name: "Azure UK South", provider: Provider::Azure, position: pos(51.5074, -0.1278, 0.05), code: "uksouth", server_count: 14 },
];

/// Anything that gets a marker on the globe
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Location {
    Exchange(&'static Exchange),
    Region(&'static CloudRegion),
}

impl Location {
    pub fn id(&self) -> &'static str {
        match self {
            Location::Exchange(e) => e.id,
            Location::Region(r) => r.id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Location::Exchange(e) => e.name,
            Location::Region(r) => r.name,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Location::Exchange(e) => e.provider,
            Location::Region(r) => r.provider,
        }
    }

    pub fn position(&self) -> GeoPosition {
        match self {
            Location::Exchange(e) => e.position,
            Location::Region(r) => r.position,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Location::Exchange(_) => "Exchange",
            Location::Region(_) => "Region",
        }
    }

    /// Marker colour: exchange brand colour, or the provider colour for regions
    pub fn color_hex(&self) -> &'static str {
        match self {
            Location::Exchange(e) => e.color,
            Location::Region(r) => r.provider.color_hex(),
        }
    }
}

/// Exchanges first, then regions
pub fn all_locations() -> impl Iterator<Item = Location> {
    EXCHANGES
        .iter()
        .map(Location::Exchange)
        .chain(CLOUD_REGIONS.iter().map(Location::Region))
}

pub fn find_exchange(id: &str) -> Option<&'static Exchange> {
    EXCHANGES.iter().find(|e| e.id == id)
}

/// World-space endpoints of a reading, `None` if either id is unknown
pub fn link_endpoints(reading: &LatencyReading) -> Option<(Vec3, Vec3)> {
    let from = find_exchange(&reading.from)?;
    let to = find_exchange(&reading.to)?;
    Some((from.position.to_world(), to.position.to_world()))
}

// ============================================================================
// Latency readings
// ============================================================================

pub const MIN_LATENCY_MS: f64 = 10.0;
pub const LATENCY_SPAN_MS: f64 = 200.0;

#[derive(Clone, Debug, PartialEq)]
pub struct LatencyReading {
    pub from: String,
    pub to: String,
    pub latency: f64,
    pub timestamp: DateTime<Utc>,
    /// (lat, lon) used to place the reading on the heatmap
    pub position: Option<(f64, f64)>,
}

impl LatencyReading {
    pub fn band(&self) -> LatencyBand {
        LatencyBand::of(self.latency)
    }
}

/// Produces a complete reading set on every call
pub trait LatencySource {
    fn sample(&mut self) -> Vec<LatencyReading>;
}

/// Random latencies in `[10, 210)` ms for every exchange pair
pub struct SyntheticSource {
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl LatencySource for SyntheticSource {
    fn sample(&mut self) -> Vec<LatencyReading> {
        generate_readings(EXCHANGES, &mut self.rng, Utc::now())
    }
}

/// One reading per unordered exchange pair, in catalogue order.
pub fn generate_readings<R: Rng>(exchanges: &[Exchange], rng: &mut R, now: DateTime<Utc>) -> Vec<LatencyReading> {
    let n = exchanges.len();
    let mut readings = Vec::with_capacity(n * n.saturating_sub(1) / 2);

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&exchanges[i], &exchanges[j]);
            readings.push(LatencyReading {
                from: a.id.to_string(),
                to: b.id.to_string(),
                latency: rng.gen::<f64>() * LATENCY_SPAN_MS + MIN_LATENCY_MS,
                timestamp: now,
                position: Some(midpoint(a.position, b.position)),
            });
        }
    }

    readings
}

/// Geographic midpoint along the shorter longitude path
fn midpoint(a: GeoPosition, b: GeoPosition) -> (f64, f64) {
    let lat = (a.lat + b.lat) / 2.0;
    let lon = normalize_longitude(a.lon + shortest_angular_delta(a.lon, b.lon) / 2.0);
    (lat, lon)
}

// ============================================================================
// Latency colour bands
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LatencyBand {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl LatencyBand {
    pub const ALL: [LatencyBand; 4] = [LatencyBand::Low, LatencyBand::Medium, LatencyBand::High, LatencyBand::VeryHigh];

    pub fn of(latency: f64) -> Self {
        if latency < 50.0 {
            LatencyBand::Low
        } else if latency < 100.0 {
            LatencyBand::Medium
        } else if latency < 150.0 {
            LatencyBand::High
        } else {
            LatencyBand::VeryHigh
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            LatencyBand::Low => "#00ff88",
            LatencyBand::Medium => "#ffff00",
            LatencyBand::High => "#ff9900",
            LatencyBand::VeryHigh => "#ff0000",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LatencyBand::Low => "Green   0-50 ms",
            LatencyBand::Medium => "Yellow  50-100 ms",
            LatencyBand::High => "Orange  100-150 ms",
            LatencyBand::VeryHigh => "Red     150+ ms",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_covers_every_pair_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let readings = generate_readings(EXCHANGES, &mut rng, Utc::now());
        let n = EXCHANGES.len();
        assert_eq!(readings.len(), n * (n - 1) / 2);

        let mut seen = std::collections::HashSet::new();
        for r in &readings {
            assert_ne!(r.from, r.to);
            assert!(seen.insert((r.from.clone(), r.to.clone())));
            assert!(!seen.contains(&(r.to.clone(), r.from.clone())));
        }
        assert_eq!(readings[0].from, "binance-tokyo");
        assert_eq!(readings[0].to, "okx-singapore");
    }

    #[test]
    fn generated_latency_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            for r in generate_readings(EXCHANGES, &mut rng, Utc::now()) {
                assert!(r.latency >= 10.0 && r.latency < 210.0, "latency {}", r.latency);
            }
        }
    }

    #[test]
    fn small_catalogues() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_readings(&EXCHANGES[..1], &mut rng, Utc::now()).is_empty());
        assert!(generate_readings(&[], &mut rng, Utc::now()).is_empty());
        assert_eq!(generate_readings(&EXCHANGES[..3], &mut rng, Utc::now()).len(), 3);
    }

    #[test]
    fn readings_share_one_timestamp() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_readings(EXCHANGES, &mut rng, now).iter().all(|r| r.timestamp == now));
    }

    #[test]
    fn midpoint_crosses_antimeridian_the_short_way() {
        let (_, lon) = midpoint(pos(0.0, 170.0, 0.0), pos(0.0, -170.0, 0.0));
        assert!((lon.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn link_endpoints_sit_above_the_surface() {
        let mut rng = StdRng::seed_from_u64(9);
        let r = &generate_readings(EXCHANGES, &mut rng, Utc::now())[0];
        let (a, b) = link_endpoints(r).unwrap();
        assert!((a.length() - (GLOBE_RADIUS + 0.1)).abs() < 1e-9);
        assert!((b.length() - (GLOBE_RADIUS + 0.1)).abs() < 1e-9);

        let unknown = LatencyReading { from: "nowhere".into(), ..r.clone() };
        assert!(link_endpoints(&unknown).is_none());
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(LatencyBand::of(0.0), LatencyBand::Low);
        assert_eq!(LatencyBand::of(49.99), LatencyBand::Low);
        assert_eq!(LatencyBand::of(50.0), LatencyBand::Medium);
        assert_eq!(LatencyBand::of(99.9), LatencyBand::Medium);
        assert_eq!(LatencyBand::of(100.0), LatencyBand::High);
        assert_eq!(LatencyBand::of(149.9), LatencyBand::High);
        assert_eq!(LatencyBand::of(150.0), LatencyBand::VeryHigh);
        assert_eq!(LatencyBand::of(500.0), LatencyBand::VeryHigh);
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("aws".parse::<Provider>().unwrap(), Provider::Aws);
        assert_eq!(" Azure ".parse::<Provider>().unwrap(), Provider::Azure);
        assert_eq!("GCP".parse::<Provider>().unwrap(), Provider::Gcp);
        assert!("oracle".parse::<Provider>().is_err());
    }

    #[test]
    fn exchange_regions_exist_for_most_exchanges() {
        let matched = EXCHANGES
            .iter()
            .filter(|e| CLOUD_REGIONS.iter().any(|r| r.code == e.region && r.provider == e.provider))
            .count();
        // Huobi Seoul has no matching region in the catalogue
        assert_eq!(matched, EXCHANGES.len() - 1);
    }
}
