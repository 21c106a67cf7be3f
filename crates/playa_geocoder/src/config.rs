//! Geocoder configuration

use crate::ConfigError;
use playa_script::ScriptOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides [`ScriptOptions::asset_path`] when set.
pub const ASSET_ENV_VAR: &str = "PLAYA_GEOCODER_ASSET";

/// Geocoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    #[serde(flatten)]
    pub script: ScriptOptions,
    pub worker_thread_name: String,
    pub completion_thread_name: String,
    /// Samples kept per direction for latency stats.
    pub latency_window: usize,
}

impl GeocoderConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `PLAYA_GEOCODER_ASSET` if present.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(asset) = lookup(ASSET_ENV_VAR).filter(|value| !value.is_empty()) {
            self.script.asset_path = PathBuf::from(asset);
        }
        self
    }

    pub fn with_asset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script.asset_path = path.into();
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            script: ScriptOptions::default(),
            worker_thread_name: "playa-geocoder".to_owned(),
            completion_thread_name: "playa-geocoder-main".to_owned(),
            latency_window: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeocoderConfig::default();
        assert_eq!(config.script.asset_path, Path::new("bundle.js"));
        assert_eq!(config.script.bootstrap_function, "prepare");
        assert_eq!(config.script.forward_function, "forwardGeocode");
        assert_eq!(config.script.reverse_function, "reverseGeocode");
        assert_eq!(config.worker_thread_name, "playa-geocoder");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeocoderConfig::from_json_str(
            r#"{
                "asset_path": "data/playa.js",
                "memory_limit_bytes": 33554432,
                "latency_window": 16
            }"#,
        )
        .unwrap();
        assert_eq!(config.script.asset_path, Path::new("data/playa.js"));
        assert_eq!(config.script.memory_limit_bytes, Some(32 * 1024 * 1024));
        assert_eq!(config.script.forward_function, "forwardGeocode");
        assert_eq!(config.latency_window, 16);
        assert_eq!(config.completion_thread_name, "playa-geocoder-main");
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = GeocoderConfig::default().with_asset_path("assets/bundle.js");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GeocoderConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let err = GeocoderConfig::from_json_str("{ asset_path: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err =
            GeocoderConfig::from_json_file(Path::new("/nonexistent/geocoder.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_override() {
        let config = GeocoderConfig::default().with_overrides(|key| {
            (key == ASSET_ENV_VAR).then(|| "/opt/playa/bundle.js".to_owned())
        });
        assert_eq!(config.script.asset_path, Path::new("/opt/playa/bundle.js"));

        // Empty value is ignored
        let config = GeocoderConfig::default().with_overrides(|_| Some(String::new()));
        assert_eq!(config.script.asset_path, Path::new("bundle.js"));
    }
}
