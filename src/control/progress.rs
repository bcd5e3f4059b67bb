//! Shared interpolation progress.
//!
//! Both the robot's travel and the arm's rotation advance a scalar in
//! `[0, 1]` by `elapsed * speed` each tick. A progress of `1.0` means the
//! interpolation has settled.

/// Monotonic interpolation progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress(f32);

impl Progress {
    /// A settled progress (nothing to interpolate).
    pub const SETTLED: Self = Self(1.0);

    /// A fresh interpolation at its start.
    pub const START: Self = Self(0.0);

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_settled(self) -> bool {
        self.0 >= 1.0
    }

    /// Advance by `elapsed_secs * speed`, clamped.
    ///
    /// Returns `true` exactly once: on the call that moves the progress to
    /// `1.0`. Calls on an already-settled progress return `false`.
    pub fn advance(&mut self, elapsed_secs: f32, speed: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        let step = elapsed_secs * speed;
        if step.is_finite() && step > 0.0 {
            self.0 = (self.0 + step).clamp(0.0, 1.0);
        }
        self.is_settled()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::SETTLED
    }
}
