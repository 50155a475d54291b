//! Broad phase + narrow phase pairwise collision detection.

use race_core::{AgentId, Vec3};

use crate::{CellKey, CollisionBody, CollisionError, CollisionResult, SpatialGrid};

/// Contact geometry for one overlapping pair.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Impact {
    /// Unit vector from `a` towards `b`.  `Vec3::ZERO` when the two centres
    /// coincide and no direction can be derived.
    pub normal: Vec3,
    /// `r_a + r_b − distance`, always positive.
    pub penetration: f64,
    /// Midpoint between the two centres.
    pub point: Vec3,
    /// Centre distance at detection time.
    pub distance: f64,
}

/// A detected overlap between two agents, with `a < b`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collision {
    pub a:      AgentId,
    pub b:      AgentId,
    pub impact: Impact,
}

/// Work counters from the most recent [`CollisionDetector::detect`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectorStats {
    pub bodies:          usize,
    pub occupied_cells:  usize,
    /// Pairs that survived the broad phase.
    pub candidate_pairs: usize,
    /// Pairs that actually overlap.
    pub collisions:      usize,
}

/// Uniform-grid collision detector.
///
/// Holds the grid between calls only to reuse its allocation; every call to
/// [`detect`](Self::detect) rebuilds it from the given bodies.
pub struct CollisionDetector {
    cell_size: f64,
    grid:      SpatialGrid,
    stats:     DetectorStats,
}

impl CollisionDetector {
    /// Create a detector with the configured broad-phase cell size.
    pub fn new(cell_size: f64) -> CollisionResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(CollisionError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            grid: SpatialGrid::new(cell_size),
            stats: DetectorStats::default(),
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    /// Find every overlapping pair in `bodies`.
    ///
    /// Pairs are reported once, as `(lower id, higher id)`, sorted
    /// ascending.  A body is never tested against itself.
    pub fn detect(&mut self, bodies: &[CollisionBody]) -> Vec<Collision> {
        // A cell must be at least one diameter wide for the 27-cell
        // neighbourhood to cover every possible contact.
        let max_radius = bodies.iter().map(|b| b.radius).fold(0.0_f64, f64::max);
        let cell_size = self.cell_size.max(2.0 * max_radius);

        self.grid.rebuild(bodies, cell_size);

        let mut candidates = 0;
        let mut collisions = Vec::new();
        for body in bodies {
            let home = CellKey::of(body.position, cell_size);
            for key in home.neighbourhood() {
                for &j in self.grid.cell(key) {
                    let other = &bodies[j];
                    // Skips identical ids and reports each unordered pair once.
                    if other.id <= body.id {
                        continue;
                    }
                    candidates += 1;
                    if let Some(impact) = narrow_phase(body, other) {
                        collisions.push(Collision { a: body.id, b: other.id, impact });
                    }
                }
            }
        }
        collisions.sort_by_key(|c| (c.a, c.b));

        self.stats = DetectorStats {
            bodies:          bodies.len(),
            occupied_cells:  self.grid.occupied_cells(),
            candidate_pairs: candidates,
            collisions:      collisions.len(),
        };
        collisions
    }
}

/// Exact sphere–sphere overlap test.
///
/// Touching spheres (`distance == r_a + r_b`) do not collide.
pub fn narrow_phase(a: &CollisionBody, b: &CollisionBody) -> Option<Impact> {
    if a.id == b.id {
        return None;
    }
    let delta = b.position - a.position;
    let distance = delta.length();
    let reach = a.radius + b.radius;
    if distance >= reach {
        return None;
    }
    Some(Impact {
        normal: delta.normalize_or_zero(),
        penetration: reach - distance,
        point: a.position.midpoint(b.position),
        distance,
    })
}
