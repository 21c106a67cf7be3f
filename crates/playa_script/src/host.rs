//! Script Engine Host
//!
//! Owns one interpreter loaded with the lookup asset and answers the two
//! geocoding primitives through it. A host whose asset failed to load stays
//! degraded for its whole lifetime and answers "no result" to everything.

use crate::runtime::{caught, global_function, is_falsy, RuntimeLimits, ScriptRuntime};
use crate::ScriptError;
use playa_core::{Coordinate, LookupEngine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Global under which the bootstrap handle is kept between calls.
const HANDLE_GLOBAL: &str = "geocoder";

/// Where the lookup asset lives and how to call into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    pub asset_path: PathBuf,
    pub bootstrap_function: String,
    pub forward_function: String,
    pub reverse_function: String,
    pub memory_limit_bytes: Option<usize>,
    pub max_stack_size_bytes: Option<usize>,
}

impl ScriptOptions {
    fn limits(&self) -> RuntimeLimits {
        RuntimeLimits {
            memory_limit_bytes: self.memory_limit_bytes,
            max_stack_size_bytes: self.max_stack_size_bytes,
        }
    }
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("bundle.js"),
            bootstrap_function: "prepare".to_owned(),
            forward_function: "forwardGeocode".to_owned(),
            reverse_function: "reverseGeocode".to_owned(),
            memory_limit_bytes: None,
            max_stack_size_bytes: None,
        }
    }
}

/// Interpreter-backed [`LookupEngine`].
pub struct ScriptHost {
    /// `None` once loading failed.
    runtime: Option<ScriptRuntime>,
    options: ScriptOptions,
}

impl ScriptHost {
    /// Read and evaluate `options.asset_path`. Never fails; a missing or
    /// broken asset yields a degraded host.
    pub fn load(options: ScriptOptions) -> Self {
        let loaded = ScriptRuntime::new(options.limits()).and_then(|runtime| {
            runtime.expose_global_as_window()?;
            runtime.execute_file(&options.asset_path)?;
            runtime.call_into_global(&options.bootstrap_function, HANDLE_GLOBAL)?;
            Ok(runtime)
        });
        Self::finish(loaded, options)
    }

    /// Evaluate an asset already in memory (e.g. from `include_str!`).
    pub fn from_source(source: &str, options: ScriptOptions) -> Self {
        let loaded = ScriptRuntime::new(options.limits()).and_then(|runtime| {
            runtime.expose_global_as_window()?;
            runtime.execute(source)?;
            runtime.call_into_global(&options.bootstrap_function, HANDLE_GLOBAL)?;
            Ok(runtime)
        });
        Self::finish(loaded, options)
    }

    fn finish(loaded: Result<ScriptRuntime, ScriptError>, options: ScriptOptions) -> Self {
        let runtime = match loaded {
            Ok(runtime) => {
                tracing::info!(asset = %options.asset_path.display(), "Lookup asset loaded");
                Some(runtime)
            }
            Err(err) => {
                tracing::error!(
                    asset = %options.asset_path.display(),
                    error = %err,
                    "Lookup asset failed to load; geocoder is degraded"
                );
                None
            }
        };

        Self { runtime, options }
    }

    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    fn forward(&self, address: &str) -> Result<Option<Value>, ScriptError> {
        let Some(runtime) = &self.runtime else {
            return Ok(None);
        };

        runtime.with(|ctx| -> Result<Option<Value>, ScriptError> {
            let globals = ctx.globals();
            let func = global_function(&globals, &self.options.forward_function)?;
            let handle: rquickjs::Value = globals.get(HANDLE_GLOBAL)?;

            let result: rquickjs::Value = caught(&ctx, func.call((handle, address.to_owned())))?;
            if is_falsy(&result) {
                return Ok(None);
            }

            // Bridge through JSON so extraction never touches interpreter values
            let Some(json) = caught(&ctx, ctx.json_stringify(result))? else {
                return Ok(None);
            };
            let json = json.to_string()?;
            Ok(Some(serde_json::from_str(&json)?))
        })
    }

    fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, ScriptError> {
        let Some(runtime) = &self.runtime else {
            return Ok(None);
        };

        runtime.with(|ctx| -> Result<Option<String>, ScriptError> {
            let globals = ctx.globals();
            let func = global_function(&globals, &self.options.reverse_function)?;
            let handle: rquickjs::Value = globals.get(HANDLE_GLOBAL)?;

            let result: rquickjs::Value = caught(
                &ctx,
                func.call((handle, coordinate.latitude, coordinate.longitude)),
            )?;
            let Some(address) = result.as_string() else {
                if !is_falsy(&result) {
                    tracing::debug!(%coordinate, "Reverse lookup returned a non-string");
                }
                return Ok(None);
            };
            let address = address.to_string()?;
            Ok((!address.is_empty()).then_some(address))
        })
    }
}

impl LookupEngine for ScriptHost {
    fn forward_geocode(&mut self, address: &str) -> Option<Value> {
        self.forward(address).unwrap_or_else(|err| {
            tracing::error!(%address, error = %err, "Geocoder exception");
            None
        })
    }

    fn reverse_geocode(&mut self, coordinate: Coordinate) -> Option<String> {
        self.reverse(coordinate).unwrap_or_else(|err| {
            tracing::error!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                error = %err,
                "Geocoder exception"
            );
            None
        })
    }

    fn is_degraded(&self) -> bool {
        self.runtime.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playa_core::extract_coordinate;
    use std::path::Path;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bundle.js");

    fn fixture_host() -> ScriptHost {
        ScriptHost::load(ScriptOptions {
            asset_path: PathBuf::from(FIXTURE),
            ..ScriptOptions::default()
        })
    }

    #[test]
    fn test_fixture_loads() {
        let host = fixture_host();
        assert!(!host.is_degraded());
        assert_eq!(host.options().asset_path, Path::new(FIXTURE));
    }

    #[test]
    fn test_forward_lookup() {
        let mut host = fixture_host();
        let raw = host.forward_geocode("6:15 & A");
        assert!(raw.is_some());

        let coordinate = extract_coordinate(raw.as_ref());
        assert_eq!(coordinate, Coordinate::new(40.78, -119.205));
    }

    #[test]
    fn test_forward_lookup_is_order_insensitive() {
        let mut host = fixture_host();
        let first = extract_coordinate(host.forward_geocode("6:15 & A").as_ref());
        let second = extract_coordinate(host.forward_geocode("A & 6:15").as_ref());
        assert!(first.is_valid());
        assert_eq!(first, second);
    }

    #[test]
    fn test_forward_lookup_polygon() {
        let mut host = fixture_host();
        let coordinate =
            extract_coordinate(host.forward_geocode("Center Camp Plaza @ 7:30").as_ref());
        assert_eq!(coordinate, Coordinate::new(40.781, -119.213));
    }

    #[test]
    fn test_forward_lookup_unknown() {
        let mut host = fixture_host();
        assert_eq!(host.forward_geocode("Nowhere Street"), None);
    }

    #[test]
    fn test_address_text_is_never_evaluated() {
        let mut host = fixture_host();
        let hostile = r#""); globalThis.pwned = true; ("#;
        assert_eq!(host.forward_geocode(hostile), None);

        let runtime = host.runtime.as_ref().unwrap();
        let pwned =
            runtime.with(|ctx| ctx.eval::<bool, _>("typeof pwned !== 'undefined'").unwrap());
        assert!(!pwned);
    }

    #[test]
    fn test_fault_is_contained() {
        let mut host = fixture_host();
        assert_eq!(host.forward_geocode("explode"), None);

        // Host stays usable after the exception
        assert!(host.forward_geocode("6:15 & A").is_some());
        assert!(!host.is_degraded());
    }

    #[test]
    fn test_reverse_lookup() {
        let mut host = fixture_host();
        let address = host.reverse_geocode(Coordinate::new(40.7901, -119.2199));
        assert_eq!(address.as_deref(), Some("6:15 & A"));

        assert_eq!(host.reverse_geocode(Coordinate::new(51.5, -0.12)), None);
    }

    #[test]
    fn test_reverse_fault_is_contained() {
        let mut host = fixture_host();
        assert_eq!(host.reverse_geocode(Coordinate::new(10.0, -179.5)), None);
        assert!(host.reverse_geocode(Coordinate::new(40.7901, -119.2199)).is_some());
    }

    #[test]
    fn test_missing_asset_degrades() {
        let mut host = ScriptHost::load(ScriptOptions {
            asset_path: PathBuf::from("/nonexistent/bundle.js"),
            ..ScriptOptions::default()
        });
        assert!(host.is_degraded());
        assert_eq!(host.forward_geocode("6:15 & A"), None);
        assert_eq!(host.reverse_geocode(Coordinate::new(40.7901, -119.2199)), None);
    }

    #[test]
    fn test_broken_bootstrap_degrades() {
        let host = ScriptHost::from_source(
            "function prepare() { throw new Error('no data'); }",
            ScriptOptions::default(),
        );
        assert!(host.is_degraded());
    }

    #[test]
    fn test_from_source_with_custom_names() {
        let options = ScriptOptions {
            bootstrap_function: "init".to_owned(),
            forward_function: "lookup".to_owned(),
            ..ScriptOptions::default()
        };
        let mut host = ScriptHost::from_source(
            r#"
            function init() { return { x: -119.2, y: 40.7 }; }
            function lookup(g, address) {
                return { geometry: { coordinates: [g.x, g.y] }, name: address };
            }
            "#,
            options,
        );
        let coordinate = extract_coordinate(host.forward_geocode("anything").as_ref());
        assert_eq!(coordinate, Coordinate::new(40.7, -119.2));

        // No reverse primitive defined: fault, not crash
        assert_eq!(host.reverse_geocode(Coordinate::new(40.7, -119.2)), None);
    }
}
