//! Coordinate extraction
//!
//! Turns a raw forward result into a single representative [`Coordinate`].
//! Storage order is GeoJSON (`[longitude, latitude]`); output is latitude first.

use crate::Coordinate;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Value,
}

/// List levels allowed around a position: a point list, then a ring list.
const MAX_NESTING: usize = 2;

/// First `[lon, lat]` of `coordinates`, following the first element of each
/// list level. Later elements are never inspected.
fn representative(coordinates: &Value, nesting: usize) -> Option<[f64; 2]> {
    if let Ok(position) = <[f64; 2]>::deserialize(coordinates) {
        return Some(position);
    }
    if nesting == MAX_NESTING {
        return None;
    }
    match coordinates {
        Value::Array(items) => representative(items.first()?, nesting + 1),
        _ => None,
    }
}

/// Extract the representative point of a raw forward result.
///
/// Returns [`Coordinate::INVALID`] when the result is missing, malformed,
/// out of range, or has a zero component.
pub fn extract_coordinate(raw: Option<&Value>) -> Coordinate {
    let Some(raw) = raw else {
        return Coordinate::INVALID;
    };

    let feature = match Feature::deserialize(raw) {
        Ok(feature) => feature,
        Err(err) => {
            tracing::debug!(error = %err, "Unrecognized geometry shape");
            return Coordinate::INVALID;
        }
    };

    let position = representative(&feature.geometry.coordinates, 0);
    if position.is_none() {
        tracing::debug!("Unrecognized geometry shape");
    }
    position.map(Coordinate::from_lon_lat).into()
}
