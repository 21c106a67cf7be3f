//! Playa Script Host
//!
//! Geocoding via a bundled JavaScript lookup asset, evaluated in QuickJS.
//!
//! ## Architecture
//!
//! - **Runtime:** one QuickJS runtime + context per host, never shared
//! - **Asset:** evaluated once at load; a bootstrap function builds the handle
//! - **Calls:** primitives are called as functions with structured arguments,
//!   never by splicing caller text into evaluated source
//! - **Faults:** exceptions are caught, logged, and become "no result"
//!
//! A host is not `Send`; build it on the thread that will use it.

pub mod error;
pub mod host;
pub mod runtime;

pub use error::ScriptError;
pub use host::{ScriptHost, ScriptOptions};

pub use rquickjs;
