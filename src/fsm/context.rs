//! Shared mutable context threaded through every FSM handler.
//!
//! `SequencerContext` is the single struct that state handlers read from
//! and write to. It holds the in-flight command, robot motion, the arm
//! controller, the display timer and the outgoing event buffer. Think of
//! it as the "blackboard" in a blackboard architecture.

use chrono::{DateTime, Utc};

use crate::config::TwinConfig;
use crate::control::orientation::{ArmRig, OrientationController};
use crate::control::pose::Vec3;
use crate::control::progress::Progress;
use crate::scheduler::{Generation, Scheduler};
use crate::telemetry::record::{ActionKind, RobotCommand};

use super::sequencer::SequencerEvent;

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// Deferred work owned by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerTimer {
    /// The action indicator has been shown long enough.
    DisplayTimeout,
}

// ---------------------------------------------------------------------------
// Motion parameters (copied from config at construction)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct MotionParams {
    /// Travel progress per second.
    pub move_speed: f32,
    /// Seconds the action indicator stays up.
    pub action_display_secs: f32,
    /// Arm base position relative to the robot origin.
    pub arm_mount_offset: Vec3,
}

// ---------------------------------------------------------------------------
// SequencerContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct SequencerContext {
    // -- Timing --
    /// Seconds covered by the current tick.
    pub elapsed_secs: f32,

    // -- Configuration --
    pub params: MotionParams,

    // -- Command gate --
    /// Timestamp of the newest accepted command; never decreases.
    pub last_accepted: Option<DateTime<Utc>>,
    /// Set only while the phase is not `Idle`.
    pub current_command: Option<RobotCommand>,
    /// Bumped on every accepted command; guards the display timer.
    pub generation: Generation,

    // -- Motion --
    pub robot_position: Vec3,
    pub move_from: Vec3,
    pub move_to: Vec3,
    pub progress: Progress,
    /// World position of the plant being serviced.
    pub target_world: Vec3,

    // -- Acting --
    pub indicator: Option<ActionKind>,
    /// Latched by the display timer, consumed by the `Acting` handler.
    pub display_elapsed: bool,
    pub timers: Scheduler<SequencerTimer>,

    // -- Arm --
    pub arm: OrientationController,

    // -- Output --
    /// Events produced during the current call, drained by the owner.
    pub outbox: Vec<SequencerEvent>,
}

impl SequencerContext {
    /// Create a context with the robot parked at `config.robot_home`.
    pub fn new(config: &TwinConfig, rig: ArmRig) -> Self {
        let home = config.robot_home;
        let arm = OrientationController::new(
            rig,
            config.rotation_speed,
            home + config.arm_mount_offset,
        );
        Self {
            elapsed_secs: 0.0,
            params: MotionParams {
                move_speed: config.move_speed,
                action_display_secs: config.action_display_secs,
                arm_mount_offset: config.arm_mount_offset,
            },
            last_accepted: None,
            current_command: None,
            generation: 0,
            robot_position: home,
            move_from: home,
            move_to: home,
            progress: Progress::SETTLED,
            target_world: home,
            indicator: None,
            display_elapsed: false,
            timers: Scheduler::new(),
            arm,
            outbox: Vec::new(),
        }
    }

    /// World position of the arm base.
    pub fn arm_base_world(&self) -> Vec3 {
        self.robot_position + self.params.arm_mount_offset
    }

    /// Change the indicator, recording an event only on an actual change.
    pub fn set_indicator(&mut self, indicator: Option<ActionKind>) {
        if self.indicator != indicator {
            self.indicator = indicator;
            self.outbox.push(SequencerEvent::IndicatorChanged(indicator));
        }
    }
}
