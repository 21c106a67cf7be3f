//! Playa Metrics - lookup diagnostics
//!
//! Counters and rolling latency windows for the geocoder worker. With the
//! `metrics` feature off, every type here is a no-op stub and reads as zero.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use playa_metrics::{Counter, LatencyProfiler};
//!
//! let mut profiler = LatencyProfiler::new(128); // Keep the last 128 samples per name
//! let answer = profiler.time("forward", || lookup(address));
//! println!("avg: {:?}", profiler.average("forward"));
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod latency_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use latency_profiler::LatencyProfiler;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;

/// True when collection is compiled in.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
}

#[cfg(not(feature = "metrics"))]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
}

#[cfg(not(feature = "metrics"))]
impl Default for Counter {
    fn default() -> Self { Self }
}

#[cfg(not(feature = "metrics"))]
pub struct LatencyProfiler;

#[cfg(not(feature = "metrics"))]
impl LatencyProfiler {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn time<F, R>(&mut self, _name: &str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn average(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn max(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn samples(&self, _name: &str) -> usize { 0 }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_compiles_with_either_feature_set() {
        let mut buffer = super::RingBuffer::<std::time::Duration>::new(10);
        buffer.push(std::time::Duration::from_millis(1));
        let mut counter = super::Counter::new();
        counter.increment("forward.found", 1);
        let mut profiler = super::LatencyProfiler::new(8);
        assert_eq!(profiler.time("forward", || 7), 7);

        if !super::ENABLED {
            assert_eq!(counter.get("forward.found"), 0);
            assert!(buffer.is_empty());
        }
    }
}
