//! Worker-side lookup diagnostics
//!
//! A side channel only: lookups report "no result" the same way whether the
//! data had no answer or the engine is broken, and these counters do not
//! change that.

use playa_metrics::{Counter, LatencyProfiler};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    const fn name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }

    const fn counter(self, found: bool) -> &'static str {
        match (self, found) {
            (Direction::Forward, true) => "forward.found",
            (Direction::Forward, false) => "forward.not_found",
            (Direction::Reverse, true) => "reverse.found",
            (Direction::Reverse, false) => "reverse.not_found",
        }
    }
}

pub(crate) struct LookupStats {
    counter: Counter,
    latency: LatencyProfiler,
}

impl LookupStats {
    pub(crate) fn new(latency_window: usize) -> Self {
        Self {
            counter: Counter::new(),
            latency: LatencyProfiler::new(latency_window),
        }
    }

    pub(crate) fn time<F, R>(&mut self, direction: Direction, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.latency.time(direction.name(), f)
    }

    pub(crate) fn record(&mut self, direction: Direction, found: bool) {
        self.counter.increment(direction.counter(found), 1);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            forward: self.direction(Direction::Forward),
            reverse: self.direction(Direction::Reverse),
        }
    }

    fn direction(&self, direction: Direction) -> DirectionStats {
        DirectionStats {
            found: self.counter.get(direction.counter(true)),
            not_found: self.counter.get(direction.counter(false)),
            average_latency: self.latency.average(direction.name()),
            max_latency: self.latency.max(direction.name()),
        }
    }
}

/// Lookup counts and latencies at one point in time.
///
/// All zeros when built without the `metrics` feature.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub forward: DirectionStats,
    pub reverse: DirectionStats,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectionStats {
    pub found: usize,
    pub not_found: usize,
    pub average_latency: Duration,
    pub max_latency: Duration,
}

impl DirectionStats {
    pub fn total(&self) -> usize {
        self.found + self.not_found
    }
}
