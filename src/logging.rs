//! tracing subscriber setup.
//!
//! The dashboard owns the terminal, so it logs to a file; one-shot commands
//! log to stderr.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

pub const LOG_ENV: &str = "LATENCY_GLOBE_LOG";

pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("latency-globe")
        .join("latency-globe.log")
}

/// Explicit level wins, then `LATENCY_GLOBE_LOG`, then `fallback`
fn filter(level: Option<&str>, fallback: &str) -> EnvFilter {
    level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

pub fn init_file(path: &Path, level: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level, "info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

pub fn init_stderr(level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level, "warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_namespaced() {
        let path = default_log_path();
        assert!(path.ends_with("latency-globe/latency-globe.log"));
    }

    #[test]
    fn file_logging_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");
        init_file(&path, Some("debug")).unwrap();
        assert!(path.exists());
    }
}
