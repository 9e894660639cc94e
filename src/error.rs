//! Error types shared across the dashboard and the one-shot commands.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Terminal or filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing CSV rows failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Encoding or decoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The settings file exists but could not be parsed.
    #[error("invalid settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A link was requested between endpoints with no reading.
    #[error("no latency reading between {from} and {to}")]
    UnknownLink { from: String, to: String },

    /// A command-line value could not be interpreted.
    #[error("invalid value for {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
