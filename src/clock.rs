//! Monotonic time sources for computing frame deltas.

use std::time::Instant;

/// A monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&mut self) -> f64;
}

/// Wall-clock time since the clock was created.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that advances by a fixed step every time it is read.
///
/// Runs are reproducible and independent of how fast the host is, which
/// is what you want off the Pi.
pub struct SimulatedClock {
    now: f64,
    step_ms: f64,
}

impl SimulatedClock {
    /// One 60 Hz frame.
    pub const DEFAULT_STEP_MS: f64 = 16.7;

    pub fn new(step_ms: f64) -> Self {
        Self { now: 0.0, step_ms }
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP_MS)
    }
}

impl Clock for SimulatedClock {
    /// Returns the current time, then advances by one step.
    fn now_ms(&mut self) -> f64 {
        let now = self.now;
        self.now += self.step_ms;
        now
    }
}
