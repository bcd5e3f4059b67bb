//! Orientation controller for the robot's four-joint arm.
//!
//! ```text
//!   rotate_toward(base, target)
//!            │
//!            ▼
//!   ┌────────────────┐  progress < 1   ┌──────────────────┐
//!   │      Idle      │ ──────────────▶ │  Interpolating   │
//!   │ (settled pose) │ ◀────────────── │ lerp per joint   │
//!   └────────────────┘  progress == 1  └──────────────────┘
//!                        └─▶ one-shot ManipulatorOffset
//! ```
//!
//! Every joint rotates about exactly one axis. Its target angle is picked
//! from the side of the base the target lies on (negative or positive x);
//! the two remaining axes keep whatever value they had.

use core::fmt;

use log::debug;

use super::pose::{Axis, Euler, Vec3};
use super::progress::Progress;

// ---------------------------------------------------------------------------
// Rig description
// ---------------------------------------------------------------------------

/// Arm joints, ordered from the mount outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Joint {
    Base = 0,
    Shoulder = 1,
    Elbow = 2,
    Wrist = 3,
}

impl Joint {
    pub const COUNT: usize = 4;
    pub const ALL: [Joint; Self::COUNT] = [Self::Base, Self::Shoulder, Self::Elbow, Self::Wrist];
}

/// Target-angle rule for a single joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRule {
    pub axis: Axis,
    /// Angle when the target lies at negative x relative to the base.
    /// `None` holds the current angle.
    pub when_negative: Option<f32>,
    /// Angle when the target lies at zero or positive x.
    pub when_positive: Option<f32>,
}

impl JointRule {
    pub const fn hold(axis: Axis) -> Self {
        Self {
            axis,
            when_negative: None,
            when_positive: None,
        }
    }

    /// Resolve the target orientation from `current` for a normalized
    /// base-to-target direction.
    pub fn target(&self, current: Euler, direction: Vec3) -> Euler {
        let angle = if direction.x < 0.0 {
            self.when_negative
        } else {
            self.when_positive
        };
        match angle {
            Some(deg) => current.with_axis(self.axis, deg),
            None => current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    /// Offset of this joint from its parent, in the parent's frame.
    pub link: Vec3,
    /// Local orientation at rest.
    pub rest: Euler,
    pub rule: JointRule,
}

/// Kinematic description of the arm.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmRig {
    pub joints: [JointSpec; Joint::COUNT],
}

impl Default for ArmRig {
    /// Greenhouse arm: the base swings about Z to face the plant row, the
    /// upper joints hold their pose.
    fn default() -> Self {
        Self {
            joints: [
                JointSpec {
                    link: Vec3::ZERO,
                    rest: Euler::IDENTITY,
                    rule: JointRule {
                        axis: Axis::Z,
                        when_negative: Some(0.0),
                        when_positive: Some(180.0),
                    },
                },
                JointSpec {
                    link: Vec3::new(0.0, 0.15, 0.0),
                    rest: Euler::IDENTITY,
                    rule: JointRule::hold(Axis::X),
                },
                JointSpec {
                    link: Vec3::new(-0.35, 0.1, 0.0),
                    rest: Euler::IDENTITY,
                    rule: JointRule::hold(Axis::X),
                },
                JointSpec {
                    link: Vec3::new(-0.3, 0.0, 0.0),
                    rest: Euler::IDENTITY,
                    rule: JointRule::hold(Axis::X),
                },
            ],
        }
    }
}

impl ArmRig {
    pub fn rest_pose(&self) -> ArmPose {
        ArmPose {
            joints: self.joints.map(|j| j.rest),
        }
    }

    /// World position of the wrist for `pose` with the base at `base_world`.
    pub fn tip_position(&self, base_world: Vec3, pose: &ArmPose) -> Vec3 {
        let mut position = base_world + self.joints[0].link;
        let mut frame = pose.joints[0].to_matrix();
        for (spec, local) in self.joints.iter().zip(pose.joints.iter()).skip(1) {
            position = position + frame * spec.link;
            frame = frame * local.to_matrix();
        }
        position
    }
}

// ---------------------------------------------------------------------------
// Pose and report types
// ---------------------------------------------------------------------------

/// Local orientation of every joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub joints: [Euler; Joint::COUNT],
}

impl ArmPose {
    pub fn get(&self, joint: Joint) -> Euler {
        self.joints[joint as usize]
    }

    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        let mut joints = a.joints;
        for (i, out) in joints.iter_mut().enumerate() {
            *out = Euler::lerp(a.joints[i], b.joints[i], t);
        }
        Self { joints }
    }
}

/// Displacement of the wrist from its resting reference point, reported
/// once per settled rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulatorOffset(pub Vec3);

impl fmt::Display for ManipulatorOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPhase {
    Idle,
    Interpolating,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct OrientationController {
    rig: ArmRig,
    speed: f32,
    base_world: Vec3,
    /// Wrist world position captured at construction.
    rest_tip: Vec3,
    current: ArmPose,
    initial: ArmPose,
    target: ArmPose,
    progress: Progress,
}

impl OrientationController {
    pub fn new(rig: ArmRig, speed: f32, base_world: Vec3) -> Self {
        let rest = rig.rest_pose();
        let rest_tip = rig.tip_position(base_world, &rest);
        Self {
            rig,
            speed,
            base_world,
            rest_tip,
            current: rest,
            initial: rest,
            target: rest,
            progress: Progress::SETTLED,
        }
    }

    /// Start interpolating every joint toward the orientation implied by
    /// `target_world`. Restarts any interpolation already in progress.
    pub fn rotate_toward(&mut self, base_world: Vec3, target_world: Vec3) {
        self.base_world = base_world;
        self.initial = self.current;

        let direction = (target_world - base_world).normalized();
        let mut target = self.current;
        for (pose, spec) in target.joints.iter_mut().zip(self.rig.joints.iter()) {
            *pose = spec.rule.target(*pose, direction);
        }
        self.target = target;
        self.progress = Progress::START;

        debug!(
            "Arm: rotating toward {} from base {} (direction {})",
            target_world, base_world, direction
        );
    }

    /// Adopt the current pose as the new baseline and stop any interpolation.
    /// No offset is reported for this.
    pub fn reset_to_initial(&mut self) -> ArmPose {
        self.initial = self.current;
        self.target = self.current;
        self.progress = Progress::SETTLED;
        self.current
    }

    /// Advance the interpolation. Returns the offset exactly once, on the
    /// tick that settles it.
    pub fn tick(&mut self, elapsed_secs: f32) -> Option<ManipulatorOffset> {
        if self.progress.is_settled() {
            return None;
        }
        let settled = self.progress.advance(elapsed_secs, self.speed);
        self.current = ArmPose::lerp(&self.initial, &self.target, self.progress.value());

        settled.then(|| ManipulatorOffset(self.tip_world() - self.rest_tip))
    }

    pub fn phase(&self) -> OrientationPhase {
        if self.progress.is_settled() {
            OrientationPhase::Idle
        } else {
            OrientationPhase::Interpolating
        }
    }

    pub fn pose(&self) -> ArmPose {
        self.current
    }

    pub fn tip_world(&self) -> Vec3 {
        self.rig.tip_position(self.base_world, &self.current)
    }
}
