//! Lookup capability
//!
//! The geocoding dataset is an opaque pair of primitives. Anything that can
//! answer them (an embedded interpreter, a precomputed index, a test table)
//! plugs in here without touching the worker or the extraction layer.

use crate::Coordinate;
use serde_json::Value;

/// Forward and reverse lookup primitives.
///
/// Methods take `&mut self`: implementations are not assumed to be
/// reentrant, and the worker that owns an engine is its only caller.
/// Implementations swallow their own faults and answer `None`.
pub trait LookupEngine {
    /// Raw forward result, shaped like a GeoJSON feature
    /// (`{"geometry": {"coordinates": ...}}`), or `None` if not found.
    fn forward_geocode(&mut self, address: &str) -> Option<Value>;

    /// Address at `coordinate`, or `None`. Callers only pass valid coordinates.
    fn reverse_geocode(&mut self, coordinate: Coordinate) -> Option<String>;

    /// True when the engine could not load its data and answers nothing.
    fn is_degraded(&self) -> bool {
        false
    }
}

impl<E: LookupEngine + ?Sized> LookupEngine for Box<E> {
    fn forward_geocode(&mut self, address: &str) -> Option<Value> {
        (**self).forward_geocode(address)
    }

    fn reverse_geocode(&mut self, coordinate: Coordinate) -> Option<String> {
        (**self).reverse_geocode(coordinate)
    }

    fn is_degraded(&self) -> bool {
        (**self).is_degraded()
    }
}
