//! Uniform 3-D grid used as the collision broad phase.
//!
//! Each body is inserted into exactly one cell, keyed by
//! `floor(position / cell_size)` per axis.  A body can only overlap bodies
//! in its own cell or one of the 26 surrounding cells as long as
//! `cell_size >= 2 * max_radius`; the detector enforces that by growing the
//! effective cell size when a larger body shows up.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use race_core::Vec3;

use crate::CollisionBody;

/// Integer cell coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(pub i32, pub i32, pub i32);

impl CellKey {
    /// Cell containing `p` for the given `cell_size`.
    #[inline]
    pub fn of(p: Vec3, cell_size: f64) -> CellKey {
        CellKey(
            (p.x / cell_size).floor() as i32,
            (p.y / cell_size).floor() as i32,
            (p.z / cell_size).floor() as i32,
        )
    }

    /// This cell and its 26 neighbours.
    pub fn neighbourhood(self) -> impl Iterator<Item = CellKey> {
        let CellKey(x, y, z) = self;
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| CellKey(x + dx, y + dy, z + dz)))
        })
    }
}

/// Cell → indices of the bodies in that cell.
///
/// Indices refer to the slice passed to [`SpatialGrid::rebuild`].
#[derive(Default)]
pub struct SpatialGrid {
    cells:     HashMap<CellKey, Vec<usize>>,
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self { cells: HashMap::default(), cell_size }
    }

    /// Discard the previous contents and insert every body in `bodies`.
    pub fn rebuild(&mut self, bodies: &[CollisionBody], cell_size: f64) {
        self.cells.clear();
        self.cell_size = cell_size;
        for (i, body) in bodies.iter().enumerate() {
            self.cells
                .entry(CellKey::of(body.position, cell_size))
                .or_default()
                .push(i);
        }
    }

    /// Body indices in `key`, or an empty slice.
    #[inline]
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
