//! The per-tick snapshot the detector works on.

use race_core::{AgentId, Vec3};

/// Position and extent of one agent, copied out of agent storage for the
/// duration of a single detection pass.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionBody {
    pub id:       AgentId,
    pub position: Vec3,
    pub radius:   f64,
}

impl CollisionBody {
    #[inline]
    pub fn new(id: AgentId, position: Vec3, radius: f64) -> Self {
        Self { id, position, radius }
    }
}
