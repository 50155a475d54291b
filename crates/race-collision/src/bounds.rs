//! Per-agent world-bounds tests, independent of the pairwise grid.

use race_core::{Axis, Bounds, Vec3};

/// Which face of the bounds box was crossed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundSide {
    Min,
    Max,
}

/// One axis on which a sphere pokes out of the bounds box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsViolation {
    pub axis:        Axis,
    pub side:        BoundSide,
    /// How far past the face the sphere extends (positive).
    pub penetration: f64,
}

/// Test a sphere of `radius` at `position` against `bounds`.
///
/// Returns at most one record per axis.  Pass `radius = 0.0` to test a
/// point.  If the box is narrower than the sphere the `Min` face wins.
pub fn check_bounds(position: Vec3, radius: f64, bounds: &Bounds) -> Vec<BoundsViolation> {
    let mut out = Vec::new();
    for axis in Axis::ALL {
        let lo = position[axis] - radius;
        let hi = position[axis] + radius;
        if lo < bounds.min[axis] {
            out.push(BoundsViolation { axis, side: BoundSide::Min, penetration: bounds.min[axis] - lo });
        } else if hi > bounds.max[axis] {
            out.push(BoundsViolation { axis, side: BoundSide::Max, penetration: hi - bounds.max[axis] });
        }
    }
    out
}
