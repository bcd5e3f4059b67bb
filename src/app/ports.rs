//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TwinService (domain)
//! ```
//!
//! Driven adapters (host bridge, event sinks, config storage, clock)
//! implement these traits. The [`TwinService`](super::service::TwinService)
//! consumes them via generics, so the domain core never touches stdout,
//! files or the wall clock directly.
//!
//! ## Failure policy
//!
//! - **HostPort** failures are logged by the service and never propagated.
//! - **ConfigPort** implementations MUST validate before returning.

use chrono::{DateTime, Utc};

use crate::config::TwinConfig;
use crate::error::{ConfigError, HostError};

// ───────────────────────────────────────────────────────────────
// Host port (driven adapter: domain → rendering host)
// ───────────────────────────────────────────────────────────────

/// Outbound calls into the rendering host.
///
/// The host may be absent (headless run, closed pipe). Implementations
/// report that as [`HostError`]; the caller logs it and moves on.
pub trait HostPort {
    /// One-shot report of the arm's settled offset, formatted `"(x, y, z)"`.
    fn report_manipulator_offset(&mut self, offset: &str) -> Result<(), HostError>;

    /// The user picked the visual of plant `id`.
    fn report_clicked_entity(&mut self, id: &str) -> Result<(), HostError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (log, scene graph,
/// test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ config storage)
// ───────────────────────────────────────────────────────────────

/// Loads twin configuration.
///
/// Invalid ranges must be rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<TwinConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source used to turn planting timestamps into ages.
pub trait ClockPort {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from its owners)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a task comes due and its generation is still current.
pub trait SchedulerDelegate<T> {
    /// * `label`: the label the task was scheduled under.
    /// * `task`: the payload captured at scheduling time.
    fn on_fired(&mut self, label: &'static str, task: T);
}
