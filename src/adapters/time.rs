//! Clock adapters.
//!
//! - [`SystemClock`] reads the wall clock; plant ages are measured against it.
//! - [`FixedClock`] returns a pinned instant for replays and tests.
//! - [`TickTimer`] measures the real time between host loop iterations.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::app::ports::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Monotonic frame timer for the tick loop.
pub struct TickTimer {
    last: Instant,
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or construction).
    pub fn lap_secs(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_is_pinned() {
        let at = Utc.with_ymd_and_hms(2025, 7, 7, 19, 0, 6).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }

    #[test]
    fn lap_is_non_negative() {
        let mut timer = TickTimer::new();
        assert!(timer.lap_secs() >= 0.0);
        assert!(timer.lap_secs() >= 0.0);
    }
}
