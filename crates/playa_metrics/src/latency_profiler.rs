//! Per-operation latency windows

use super::ring_buffer::RingBuffer;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct LatencyProfiler {
    capacity: usize,
    timings: HashMap<String, RingBuffer<Duration>>,
}

impl LatencyProfiler {
    /// Keep the last `capacity` samples per operation name.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            timings: HashMap::new(),
        }
    }

    pub fn time<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let capacity = self.capacity;
        self.timings
            .entry(name.to_owned())
            .or_insert_with(|| RingBuffer::new(capacity))
            .push(elapsed);
        result
    }

    pub fn average(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .map(RingBuffer::average)
            .unwrap_or(Duration::ZERO)
    }

    pub fn max(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .map(RingBuffer::max)
            .unwrap_or(Duration::ZERO)
    }

    pub fn samples(&self, name: &str) -> usize {
        self.timings.get(name).map(RingBuffer::len).unwrap_or(0)
    }
}
