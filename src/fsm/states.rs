//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch.
//!
//! ```text
//!  IDLE ──[command accepted]──▶ MOVING ──[progress == 1]──▶ ACTING
//!    ▲                                                        │
//!    └───────────────────[display timeout]────────────────────┘
//! ```

use log::{info, warn};

use super::context::{SequencerContext, SequencerTimer};
use super::sequencer::SequencerEvent;
use super::{StateDescriptor, StateId};
use crate::control::pose::Vec3;
use crate::control::progress::Progress;
use crate::lifecycle::Placement;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Moving
        StateDescriptor {
            id: StateId::Moving,
            name: "Moving",
            on_enter: Some(moving_enter),
            on_exit: None,
            on_update: moving_update,
        },
        // Index 2: Acting
        StateDescriptor {
            id: StateId::Acting,
            name: "Acting",
            on_enter: Some(acting_enter),
            on_exit: Some(acting_exit),
            on_update: acting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SequencerContext) {
    ctx.current_command = None;
    ctx.set_indicator(None);
    info!("IDLE: waiting for the next command");
}

fn idle_update(_ctx: &mut SequencerContext) -> Option<StateId> {
    // Leaving Idle is always forced by command acceptance.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MOVING state: robot travels along its row toward the target plant
// ═══════════════════════════════════════════════════════════════════════════

fn moving_enter(ctx: &mut SequencerContext) {
    let Some(cmd) = ctx.current_command else {
        warn!("MOVING: entered without a command");
        ctx.progress = Progress::SETTLED;
        return;
    };

    let plant = Placement::of(cmd.target_plant_id).world_position();
    ctx.target_world = plant;
    ctx.move_from = ctx.robot_position;
    // The robot only travels along z, stopping where the arm lines up
    // with the plant.
    ctx.move_to = Vec3::new(
        ctx.robot_position.x,
        ctx.robot_position.y,
        plant.z - ctx.params.arm_mount_offset.z,
    );
    ctx.progress = Progress::START;

    info!(
        "MOVING: {} -> {} for {} on plant {}",
        ctx.move_from, ctx.move_to, cmd.action, cmd.target_plant_id
    );
}

fn moving_update(ctx: &mut SequencerContext) -> Option<StateId> {
    if ctx.current_command.is_none() {
        return Some(StateId::Idle);
    }

    let settled = ctx
        .progress
        .advance(ctx.elapsed_secs, ctx.params.move_speed);
    ctx.robot_position = Vec3::lerp(ctx.move_from, ctx.move_to, ctx.progress.value());
    ctx.outbox.push(SequencerEvent::RobotMoved(ctx.robot_position));

    settled.then_some(StateId::Acting)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTING state: arm orients and the indicator shows until the display timeout
// ═══════════════════════════════════════════════════════════════════════════

fn acting_enter(ctx: &mut SequencerContext) {
    let Some(cmd) = ctx.current_command else {
        warn!("ACTING: entered without a command");
        ctx.display_elapsed = true;
        return;
    };

    let base = ctx.arm_base_world();
    ctx.arm.rotate_toward(base, ctx.target_world);

    let indicator = cmd.action.is_known().then_some(cmd.action);
    ctx.set_indicator(indicator);
    info!(
        "ACTING: {} on plant {} at {}",
        cmd.action, cmd.target_plant_id, ctx.target_world
    );

    ctx.display_elapsed = false;
    let armed = ctx.timers.schedule(
        "action-display",
        ctx.params.action_display_secs,
        ctx.generation,
        SequencerTimer::DisplayTimeout,
    );
    if armed.is_err() {
        // Without a timer the sequencer would never leave Acting.
        ctx.display_elapsed = true;
    }
}

fn acting_update(ctx: &mut SequencerContext) -> Option<StateId> {
    if ctx.display_elapsed {
        return Some(StateId::Idle);
    }
    None
}

fn acting_exit(ctx: &mut SequencerContext) {
    ctx.display_elapsed = false;
    ctx.set_indicator(None);
}
