//! Outbound application events.
//!
//! The [`TwinService`](super::service::TwinService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them.

use crate::control::orientation::ManipulatorOffset;
use crate::control::pose::Vec3;
use crate::error::{DecodeError, HostError, Rejection, WireFormatError};
use crate::fsm::StateId;
use crate::fsm::sequencer::SequencerEvent;
use crate::lifecycle::PlantChangeEvent;
use crate::telemetry::record::{ActionKind, RobotCommand};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial phase).
    Started(StateId),

    // ── Telemetry ────────────────────────────────────────────
    /// A plant visual must be rebuilt.
    PlantReplaced(PlantChangeEvent),
    /// A single plant record was unusable and skipped.
    PlantDropped(DecodeError),
    /// Plant records were held back until the robot has had time to act.
    PlantRefreshDeferred { plants: usize, delay_secs: f32 },
    /// The robot command was unusable and skipped.
    CommandDropped(DecodeError),
    /// The whole delivery was unusable; nothing was applied.
    DeliveryFailed(WireFormatError),

    // ── Sequencer ────────────────────────────────────────────
    CommandAccepted(RobotCommand),
    CommandRejected(Rejection),
    PhaseChanged { from: StateId, to: StateId },
    RobotMoved(Vec3),
    IndicatorChanged(Option<ActionKind>),
    ArmSettled(ManipulatorOffset),

    // ── Host ─────────────────────────────────────────────────
    /// An outbound report could not be delivered.
    HostUnavailable(HostError),
}

impl From<SequencerEvent> for AppEvent {
    fn from(event: SequencerEvent) -> Self {
        match event {
            SequencerEvent::PhaseChanged { from, to } => Self::PhaseChanged { from, to },
            SequencerEvent::RobotMoved(p) => Self::RobotMoved(p),
            SequencerEvent::IndicatorChanged(i) => Self::IndicatorChanged(i),
            SequencerEvent::ArmSettled(o) => Self::ArmSettled(o),
        }
    }
}
