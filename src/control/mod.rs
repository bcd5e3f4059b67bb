//! Motion control: pose math, interpolation progress and the arm's
//! orientation controller.

pub mod orientation;
pub mod pose;
pub mod progress;
