//! Inbound commands to the application service.
//!
//! These represent things the outside world hands the
//! [`TwinService`](super::service::TwinService): telemetry deliveries from
//! the dashboard and pick events from the rendering host.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// One complete telemetry document, in either wire layout.
    Telemetry(String),

    /// The user picked a visual; carries the visual's name.
    EntityPicked(String),
}
