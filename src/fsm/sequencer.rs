//! Action sequencer: the command gate in front of the FSM.
//!
//! ```text
//!   accept(cmd) ──▶ stale? ──yes──▶ Rejection::Stale
//!                     │no
//!                     ▼
//!                   busy?  ──yes──▶ Rejection::Busy
//!                     │no
//!                     ▼
//!   generation += 1, last_accepted = cmd.timestamp, FSM → Moving
//! ```
//!
//! `tick()` runs, in order: pending timers, the arm controller, the FSM.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::app::ports::SchedulerDelegate;
use crate::config::TwinConfig;
use crate::control::orientation::{ArmRig, ManipulatorOffset, OrientationPhase};
use crate::control::pose::Vec3;
use crate::error::Rejection;
use crate::scheduler::Generation;
use crate::telemetry::record::{ActionKind, RobotCommand};

use super::context::{SequencerContext, SequencerTimer};
use super::states::build_state_table;
use super::{Fsm, StateId};

/// Everything the sequencer reports to its owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequencerEvent {
    PhaseChanged { from: StateId, to: StateId },
    /// New robot position during travel.
    RobotMoved(Vec3),
    /// Action indicator shown (`Some`) or hidden (`None`).
    IndicatorChanged(Option<ActionKind>),
    /// The arm settled; carries the one-shot offset report.
    ArmSettled(ManipulatorOffset),
}

/// Latches the display timeout into the context.
struct TimerLatch {
    display_elapsed: bool,
}

impl SchedulerDelegate<SequencerTimer> for TimerLatch {
    fn on_fired(&mut self, _label: &'static str, task: SequencerTimer) {
        match task {
            SequencerTimer::DisplayTimeout => self.display_elapsed = true,
        }
    }
}

pub struct ActionSequencer {
    fsm: Fsm,
    ctx: SequencerContext,
}

impl ActionSequencer {
    pub fn new(config: &TwinConfig, rig: ArmRig) -> Self {
        let mut ctx = SequencerContext::new(config, rig);
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Gate a robot command.
    ///
    /// Stale commands are rejected before busy ones. The very first
    /// command is never stale.
    pub fn accept(&mut self, command: RobotCommand) -> Result<(), Rejection> {
        if let Some(last_accepted) = self.ctx.last_accepted {
            if command.timestamp <= last_accepted {
                info!(
                    "Sequencer: stale command at {} (last accepted {})",
                    command.timestamp.timestamp_millis(),
                    last_accepted.timestamp_millis()
                );
                return Err(Rejection::Stale {
                    timestamp: command.timestamp,
                    last_accepted,
                });
            }
        }

        let phase = self.fsm.current_state();
        if phase != StateId::Idle {
            let in_flight_target = self
                .ctx
                .current_command
                .map_or(0, |c| c.target_plant_id);
            warn!(
                "Sequencer: busy in {:?} toward plant {}, rejecting {} on {}",
                phase, in_flight_target, command.action, command.target_plant_id
            );
            return Err(Rejection::Busy {
                phase,
                in_flight_target,
            });
        }

        self.ctx.last_accepted = Some(command.timestamp);
        self.ctx.generation += 1;
        self.ctx.timers.discard_stale(self.ctx.generation);
        self.ctx.current_command = Some(command);
        self.ctx.arm.reset_to_initial();

        info!(
            "Sequencer: accepted {} on plant {} (generation {})",
            command.action, command.target_plant_id, self.ctx.generation
        );
        self.fsm.force_transition(StateId::Moving, &mut self.ctx);
        Ok(())
    }

    /// Advance timers, the arm and the FSM by `elapsed_secs`.
    /// Returns every event produced since the last drain.
    pub fn tick(&mut self, elapsed_secs: f32) -> Vec<SequencerEvent> {
        let mut latch = TimerLatch {
            display_elapsed: false,
        };
        self.ctx
            .timers
            .tick(elapsed_secs, self.ctx.generation, &mut latch);
        if latch.display_elapsed {
            self.ctx.display_elapsed = true;
        }

        if let Some(offset) = self.ctx.arm.tick(elapsed_secs) {
            info!("Sequencer: arm settled, offset {}", offset);
            self.ctx.outbox.push(SequencerEvent::ArmSettled(offset));
        }

        self.fsm.tick(&mut self.ctx, elapsed_secs);
        self.drain_events()
    }

    /// Take the events produced by `accept` and `tick` so far.
    pub fn drain_events(&mut self) -> Vec<SequencerEvent> {
        core::mem::take(&mut self.ctx.outbox)
    }

    pub fn phase(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn generation(&self) -> Generation {
        self.ctx.generation
    }

    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.ctx.last_accepted
    }

    pub fn current_command(&self) -> Option<RobotCommand> {
        self.ctx.current_command
    }

    pub fn indicator(&self) -> Option<ActionKind> {
        self.ctx.indicator
    }

    pub fn robot_position(&self) -> Vec3 {
        self.ctx.robot_position
    }

    pub fn arm_phase(&self) -> OrientationPhase {
        self.ctx.arm.phase()
    }

    /// `true` when nothing is in flight and the arm is at rest.
    pub fn is_quiescent(&self) -> bool {
        self.phase() == StateId::Idle && self.arm_phase() == OrientationPhase::Idle
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn last_accepted_never_decreases(
            stamps in proptest::collection::vec(-1_000_000i64..1_000_000, 1..60),
            dt in 0.0f32..20.0,
        ) {
            let mut seq = ActionSequencer::new(&TwinConfig::default(), ArmRig::default());
            let mut previous: Option<DateTime<Utc>> = None;

            for ms in stamps {
                let command = RobotCommand {
                    timestamp: DateTime::from_timestamp_millis(ms).unwrap(),
                    action: ActionKind::Monitor,
                    target_plant_id: 4,
                };
                let result = seq.accept(command);
                if let Some(prev) = previous {
                    if command.timestamp <= prev {
                        prop_assert!(
                            matches!(result, Err(Rejection::Stale { .. })),
                            "not-newer command must be stale"
                        );
                    }
                    prop_assert!(seq.last_accepted().unwrap() >= prev);
                } else {
                    prop_assert!(result.is_ok(), "first command must be accepted");
                }
                previous = seq.last_accepted();
                seq.tick(dt);
            }
        }
    }
}
