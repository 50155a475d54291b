//! The `Agent` record and its grouped sub-state.

use race_core::{AgentId, AgentRng, PhysicsConstants, Vec3};

use crate::behavior::BehaviorMode;
use crate::config::{AgentConfig, AgentKind};

// ── Sub-state ─────────────────────────────────────────────────────────────────

/// Physical parameters and contact state consumed by the physics engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub mass: f64,
    pub radius: f64,
    pub drag_coefficient: f64,
    pub friction_coefficient: f64,
    pub restitution: f64,
    pub area: f64,
    pub gravity_affected: bool,
    pub grounded: bool,
    /// Force applied by the agent's own propulsion, set by the AI.
    pub thrust: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Traits {
    pub max_speed: f64,
    pub acceleration: f64,
    pub turning_rate: f64,
    pub sensor_range: f64,
    pub aggression: f64,
    pub fuel_efficiency: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiState {
    pub enabled: bool,
    pub mode: BehaviorMode,
    /// Follow target.  A handle, not a reference: a removed or crashed
    /// target simply resolves to nothing.
    pub target: Option<AgentId>,
    pub waypoints: Vec<Vec3>,
    pub waypoint_index: usize,
    /// Simulation time of the last decision; `None` until the first one.
    pub last_decision: Option<f64>,
    pub decision_interval: f64,
}

impl AiState {
    /// `true` once `decision_interval` has elapsed since the last decision.
    #[inline]
    pub fn is_due(&self, sim_time: f64) -> bool {
        match self.last_decision {
            None => true,
            Some(last) => sim_time - last >= self.decision_interval,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Duration of the most recently completed lap.
    pub lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub laps: u32,
    /// Simulation time at which the current lap began.
    pub lap_start: f64,
    pub distance: f64,
    pub collisions: u32,
    pub incidents: u32,
    pub fuel_consumed: f64,
    /// Distance per unit of fuel; equals `distance` while no fuel is used.
    pub efficiency: f64,
}

impl Metrics {
    pub(crate) fn recompute_efficiency(&mut self) {
        self.efficiency = if self.fuel_consumed > 0.0 {
            self.distance / self.fuel_consumed
        } else {
            self.distance
        };
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One simulated participant.  Owned exclusively by the
/// [`AgentManager`](crate::AgentManager).
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub kind: AgentKind,

    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Euler angles in radians: `x` pitch, `y` yaw, `z` roll.
    pub rotation: Vec3,

    pub body: Body,
    pub traits: Traits,
    pub ai: AiState,
    pub metrics: Metrics,

    /// Participates in physics, AI and ranking.
    pub active: bool,
    /// Cleared by a crash; a dead agent stays addressable until removed.
    pub alive: bool,

    forces: Vec<Vec3>,
    rng: AgentRng,
}

impl Agent {
    /// Build an agent from a validated config, filling unset physical
    /// coefficients from the world's defaults.
    pub fn from_config(
        id: AgentId,
        cfg: &AgentConfig,
        constants: &PhysicsConstants,
        seed: u64,
    ) -> Self {
        Self {
            id,
            name: cfg.name.clone(),
            kind: cfg.kind,
            position: cfg.position,
            velocity: cfg.velocity,
            acceleration: Vec3::ZERO,
            rotation: Vec3::new(0.0, cfg.heading, 0.0),
            body: Body {
                mass:                 cfg.mass,
                radius:               cfg.radius,
                drag_coefficient:     cfg.drag_coefficient.unwrap_or(constants.default_drag),
                friction_coefficient: cfg.friction_coefficient.unwrap_or(constants.default_friction),
                restitution:          cfg.restitution.unwrap_or(constants.default_restitution),
                area:                 cfg.area,
                gravity_affected:     cfg.gravity_affected,
                grounded:             false,
                thrust:               Vec3::ZERO,
            },
            traits: Traits {
                max_speed:       cfg.max_speed,
                acceleration:    cfg.acceleration,
                turning_rate:    cfg.turning_rate,
                sensor_range:    cfg.sensor_range,
                aggression:      cfg.aggression,
                fuel_efficiency: cfg.fuel_efficiency,
            },
            ai: AiState {
                enabled:           cfg.ai_enabled,
                mode:              cfg.behavior,
                target:            cfg.target,
                waypoints:         cfg.waypoints.clone(),
                waypoint_index:    0,
                last_decision:     None,
                decision_interval: cfg.decision_interval,
            },
            metrics: Metrics::default(),
            active: true,
            alive: true,
            forces: Vec::new(),
            rng: AgentRng::new(seed, id),
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Current yaw in radians.
    #[inline]
    pub fn heading(&self) -> f64 {
        self.rotation.y
    }

    /// Unit vector of the current heading in the XZ plane.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        let yaw = self.heading();
        Vec3::new(yaw.cos(), 0.0, yaw.sin())
    }

    /// Active and alive: moves, decides and is ranked.
    #[inline]
    pub fn is_participating(&self) -> bool {
        self.active && self.alive
    }

    /// Queue an external force for the next physics step.
    pub fn apply_force(&mut self, force: Vec3) {
        if force.is_finite() {
            self.forces.push(force);
        }
    }

    /// Forces queued since the last physics step.
    pub fn pending_forces(&self) -> &[Vec3] {
        &self.forces
    }

    /// Drain the queued forces and return their sum.
    pub fn take_forces(&mut self) -> Vec3 {
        self.forces.drain(..).fold(Vec3::ZERO, |acc, f| acc + f)
    }

    /// Stop the agent dead and remove it from play.
    pub(crate) fn crash(&mut self) {
        self.alive = false;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.body.thrust = Vec3::ZERO;
        self.forces.clear();
    }

    pub(crate) fn rng_mut(&mut self) -> &mut AgentRng {
        &mut self.rng
    }
}
