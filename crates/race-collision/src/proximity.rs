//! R-tree index over agent positions for sensor-range queries.
//!
//! Built once per AI decision phase and used to acquire the nearest other
//! agent within sensor range (follow behavior without a valid target).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use race_core::{AgentId, Vec3};

use crate::CollisionBody;

#[derive(Clone)]
struct Entry {
    point: [f64; 3],
    id:    AgentId,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for Entry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Bulk-loaded R-tree of agent centres.
pub struct ProximityIndex {
    tree: RTree<Entry>,
}

impl ProximityIndex {
    pub fn build(bodies: &[CollisionBody]) -> Self {
        let entries = bodies
            .iter()
            .map(|b| Entry { point: b.position.to_array(), id: b.id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest agent to `from` within `range`, excluding `exclude`.
    pub fn nearest_within(&self, from: Vec3, range: f64, exclude: AgentId) -> Option<AgentId> {
        let max_d2 = range * range;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&from.to_array())
            .take_while(|(_, d2)| *d2 <= max_d2)
            .find(|(e, _)| e.id != exclude)
            .map(|(e, _)| e.id)
    }
}
