//! Deterministic slot placement.
//!
//! Plants alternate between two parallel rows and advance one column
//! every two ids:
//!
//! ```text
//!   column   0    1    2    3
//!   row 1:   1    3    5    7     (x = +1)
//!   row 0:   2    4    6    8     (x = -1)
//! ```

use serde::Serialize;

use crate::control::pose::Vec3;
use crate::telemetry::record::PlantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Placement {
    /// `id mod 2`
    pub row: u8,
    /// `(id - 1) div 2`
    pub column: u16,
}

impl Placement {
    pub const fn of(id: PlantId) -> Self {
        Self {
            row: (id % 2) as u8,
            column: id.saturating_sub(1) / 2,
        }
    }

    /// Scene position of the slot: odd ids on the `x = +1` row, even ids
    /// on `x = -1`, one unit of `z` per column.
    pub fn world_position(self) -> Vec3 {
        let x = if self.row == 0 { -1.0 } else { 1.0 };
        Vec3::new(x, 0.0, f32::from(self.column))
    }
}
