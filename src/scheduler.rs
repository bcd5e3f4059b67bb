//! Deferred one-shot tasks with a generation guard.
//!
//! Every entry captures the generation that was current when it was
//! scheduled. When its delay elapses the scheduler compares that against
//! the caller's current generation: a match hands the task to the
//! [`SchedulerDelegate`], a mismatch drops it silently. Nothing is ever
//! cancelled explicitly.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   schedule(label, delay, generation, task)                   │
//! │        │                                                     │
//! │        ▼                                                     │
//! │   ┌──────────┐  tick(dt)   ┌─────────────┐                   │
//! │   │ pending  │ ──────────▶ │ delay over? │── no ──▶ wait      │
//! │   └──────────┘             └──────┬──────┘                   │
//! │                                   │ yes                      │
//! │                    generation == current?                    │
//! │                    ├── yes ─▶ delegate.on_fired(label, task) │
//! │                    └── no  ─▶ dropped (stale)                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use heapless::Vec;
use log::{debug, info, warn};

use crate::app::ports::SchedulerDelegate;

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of pending tasks per scheduler (stack-allocated).
pub const MAX_PENDING: usize = 8;

/// Monotonic identity counter used to invalidate pending tasks.
pub type Generation = u64;

/// Internal bookkeeping for a pending task.
struct Entry<T> {
    label: &'static str,
    remaining_secs: f32,
    generation: Generation,
    task: T,
}

/// Fixed-capacity queue of deferred tasks.
pub struct Scheduler<T> {
    entries: Vec<Entry<T>, MAX_PENDING>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Queue `task` to fire after `delay_secs`.
    ///
    /// Returns the task back if every slot is taken.
    pub fn schedule(
        &mut self,
        label: &'static str,
        delay_secs: f32,
        generation: Generation,
        task: T,
    ) -> Result<(), T> {
        let entry = Entry {
            label,
            remaining_secs: delay_secs.max(0.0),
            generation,
            task,
        };
        match self.entries.push(entry) {
            Ok(()) => {
                debug!(
                    "Scheduler: '{}' armed for {:.1}s (generation {})",
                    label, delay_secs, generation
                );
                Ok(())
            }
            Err(rejected) => {
                warn!("Scheduler: no free slot for '{}'", label);
                Err(rejected.task)
            }
        }
    }

    /// Advance every pending task by `elapsed_secs` and fire the due ones
    /// in scheduling order.
    pub fn tick(
        &mut self,
        elapsed_secs: f32,
        current_generation: Generation,
        delegate: &mut impl SchedulerDelegate<T>,
    ) {
        if self.entries.is_empty() {
            return;
        }
        let step = if elapsed_secs.is_finite() {
            elapsed_secs.max(0.0)
        } else {
            0.0
        };
        for entry in self.entries.iter_mut() {
            entry.remaining_secs -= step;
        }

        while let Some(pos) = self.entries.iter().position(|e| e.remaining_secs <= 0.0) {
            let entry = self.entries.remove(pos);
            if entry.generation == current_generation {
                info!("Scheduler: '{}' fired", entry.label);
                delegate.on_fired(entry.label, entry.task);
            } else {
                debug!(
                    "Scheduler: '{}' stale (generation {} != {}), dropped",
                    entry.label, entry.generation, current_generation
                );
            }
        }
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// `true` if a task armed under `generation` is still waiting.
    pub fn is_pending(&self, generation: Generation) -> bool {
        self.entries.iter().any(|e| e.generation == generation)
    }

    /// Drop every pending task whose generation is not `current`.
    pub fn discard_stale(&mut self, current: Generation) {
        self.entries.retain(|e| e.generation == current);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
