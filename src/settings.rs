use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::Provider;
use crate::error::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardSettings {
    pub frame_time: Option<f32>,
    pub refresh_secs: Option<f64>,
    pub seed: Option<u64>,
    pub view: Option<String>,
    pub providers: Option<Vec<Provider>>,
    pub min_latency: Option<u32>,
    pub max_latency: Option<u32>,
    pub order_flow: Option<bool>,
    pub auto_rotate: Option<f64>,
    pub world_map: Option<PathBuf>,  // equirectangular image, any format `image` reads
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingSettings {
    pub file: Option<PathBuf>,
    pub level: Option<String>,
}

impl Settings {
    /// Missing file means defaults; a malformed one is an error
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| Error::Settings { path: path.to_path_buf(), source })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("latency-globe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let s = Settings::parse("").unwrap();
        assert!(s.dashboard.providers.is_none());
        assert!(s.logging.level.is_none());
    }

    #[test]
    fn full_file() {
        let s = Settings::parse(
            r#"
            [dashboard]
            refresh_secs = 2.5
            view = "heatmap"
            providers = ["AWS", "azure"]
            min_latency = 20
            order_flow = false
            world_map = "/tmp/earth.png"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(s.dashboard.refresh_secs, Some(2.5));
        assert_eq!(s.dashboard.providers, Some(vec![Provider::Aws, Provider::Azure]));
        assert_eq!(s.dashboard.min_latency, Some(20));
        assert_eq!(s.dashboard.order_flow, Some(false));
        assert_eq!(s.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(s.dashboard.view.is_none());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dashboard]\nrefresh_secs = \"soon\"\n").unwrap();
        match Settings::load_from(&path) {
            Err(Error::Settings { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected settings error, got {other:?}"),
        }
    }
}
