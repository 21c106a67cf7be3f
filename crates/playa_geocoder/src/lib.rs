//! Playa Geocoder
//!
//! Offline address ↔ coordinate lookups for the festival map, safe to call
//! from any thread.
//!
//! ```ignore
//! use playa_geocoder::{Geocoder, GeocoderConfig};
//!
//! let geocoder = Geocoder::from_config(GeocoderConfig::default().with_asset_path("bundle.js"))?;
//! let coordinate = geocoder.sync_forward_lookup("6:15 & A");
//! geocoder.async_reverse_lookup(coordinate, |address| {
//!     println!("{}", address.as_deref().unwrap_or("Address Unknown"));
//! });
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod geocoder;
pub mod stats;
pub mod worker;

pub use config::GeocoderConfig;
pub use dispatch::{CompletionContext, SerialQueue, Task};
pub use error::{ConfigError, GeocoderError};
pub use geocoder::{Geocoder, GeocoderBuilder};
pub use stats::{DirectionStats, StatsSnapshot};

pub use playa_core::{Coordinate, LookupEngine};
