use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a geocoder. Lookups themselves never fail.
#[derive(Debug, Error)]
pub enum GeocoderError {
    #[error("failed to spawn thread '{name}'")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading a [`GeocoderConfig`](crate::GeocoderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
