//! Playa Geocoder Core
//!
//! Interpreter-independent pieces of the offline geocoder:
//! - Coordinates and the invalid sentinel
//! - Extraction of a representative point from raw lookup results
//! - The pluggable lookup capability the worker drives

pub mod coordinate;
pub mod engine;
pub mod extract;

pub use coordinate::Coordinate;
pub use engine::LookupEngine;
pub use extract::extract_coordinate;

/// Geocoder version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
