//! `PhysicsEngine`: integrates the participating agents and resolves their
//! collisions once per tick.

use tracing::debug;

use race_agent::{Agent, AgentManager};
use race_collision::{Collision, CollisionBody, CollisionDetector, DetectorStats, Impact};
use race_core::{AgentId, SimConfig, World};

use crate::integrate::{StepOutcome, update_agent_physics};
use crate::resolve::resolve_collision;
use crate::{PhysicsError, PhysicsResult};

/// A detected pair after impulse resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolvedCollision {
    pub a: AgentId,
    pub b: AgentId,
    pub impact: Impact,
    /// Approach speed along the normal before resolution.
    pub closing_speed: f64,
    /// `closing_speed / crash_speed`, clamped to `[0, 1]`.
    pub severity: f64,
}

/// Cumulative counters since construction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    pub steps: u64,
    /// Single-agent integrations performed.
    pub agent_updates: u64,
    pub collisions: u64,
    /// Collisions that exchanged a non-zero impulse.
    pub impulses: u64,
    /// Agents reset after going non-finite.
    pub resets: u64,
}

pub struct PhysicsEngine {
    detector: CollisionDetector,
    crash_speed: f64,
    bodies: Vec<CollisionBody>,
    stats: PhysicsStats,
}

impl PhysicsEngine {
    pub fn new(cell_size: f64, crash_speed: f64) -> PhysicsResult<Self> {
        if !(crash_speed.is_finite() && crash_speed > 0.0) {
            return Err(PhysicsError::InvalidCrashSpeed(crash_speed));
        }
        Ok(Self {
            detector: CollisionDetector::new(cell_size)?,
            crash_speed,
            bodies: Vec::new(),
            stats: PhysicsStats::default(),
        })
    }

    pub fn from_config(config: &SimConfig) -> PhysicsResult<Self> {
        Self::new(config.grid_cell_size, config.crash_speed)
    }

    pub fn stats(&self) -> PhysicsStats {
        self.stats
    }

    /// Broad/narrow-phase counters from the latest detection pass.
    pub fn detector_stats(&self) -> DetectorStats {
        self.detector.stats()
    }

    /// One full physics step over every participating agent.
    pub fn update(&mut self, agents: &mut AgentManager, world: &World, dt: f64) -> Vec<ResolvedCollision> {
        self.stats.steps += 1;
        self.integrate_all(agents, world, dt);
        let collisions = self.detect(agents);
        self.resolve_collisions(agents, world, &collisions)
    }

    fn integrate_all(&mut self, agents: &mut AgentManager, world: &World, dt: f64) {
        let mut live: Vec<&mut Agent> = agents.iter_mut().filter(|a| a.is_participating()).collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<StepOutcome> = {
            use rayon::prelude::*;
            live.par_iter_mut().map(|a| update_agent_physics(a, world, dt)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<StepOutcome> = live.iter_mut().map(|a| update_agent_physics(a, world, dt)).collect();

        self.stats.agent_updates += outcomes.len() as u64;
        self.stats.resets += outcomes.iter().filter(|o| o.reset).count() as u64;
    }

    /// Run the detector over the current positions of participating agents.
    pub fn detect(&mut self, agents: &AgentManager) -> Vec<Collision> {
        self.bodies.clear();
        self.bodies.extend(
            agents
                .participating()
                .map(|a| CollisionBody::new(a.id, a.position, a.body.radius)),
        );
        self.detector.detect(&self.bodies)
    }

    /// Apply impulses to each detected pair in `(a, b)` order, then re-clamp
    /// both agents so separation cannot push them out of the world.
    pub fn resolve_collisions(
        &mut self,
        agents: &mut AgentManager,
        world: &World,
        collisions: &[Collision],
    ) -> Vec<ResolvedCollision> {
        let mut out = Vec::with_capacity(collisions.len());
        for c in collisions {
            let Some((a, b)) = agents.get_pair_mut(c.a, c.b) else {
                continue;
            };
            let res = resolve_collision(a, b, &c.impact);
            crate::apply_bounds_constraints(a, &world.bounds);
            crate::apply_bounds_constraints(b, &world.bounds);

            if res.impulse > 0.0 {
                self.stats.impulses += 1;
            }
            let severity = (res.closing_speed / self.crash_speed).clamp(0.0, 1.0);
            debug!(a = %c.a, b = %c.b, closing = res.closing_speed, severity, "collision resolved");
            out.push(ResolvedCollision {
                a: c.a,
                b: c.b,
                impact: c.impact,
                closing_speed: res.closing_speed,
                severity,
            });
        }
        self.stats.collisions += out.len() as u64;
        out
    }
}
