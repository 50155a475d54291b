//! Single-agent force integration and bounds containment.

use tracing::warn;

use race_agent::Agent;
use race_collision::{BoundSide, check_bounds};
use race_core::{Axis, Bounds, Vec3, World};

/// A reflected floor bounce slower than this (m/s) comes to rest.
/// Walls and ceilings always reflect.
pub const REST_SPEED: f64 = 0.5;

/// What happened during one [`update_agent_physics`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Number of axes on which the bounds clamped the agent.
    pub bounds_hits: usize,
    /// The state went non-finite and was reset.
    pub reset: bool,
}

/// Advance one agent by `dt` seconds.
///
/// Non-positive or non-finite `dt` leaves the agent untouched.
pub fn update_agent_physics(agent: &mut Agent, world: &World, dt: f64) -> StepOutcome {
    if !(dt.is_finite() && dt > 0.0) {
        return StepOutcome::default();
    }
    let start = agent.position;
    let mass = agent.body.mass;

    // ── Forces → acceleration ─────────────────────────────────────────────
    let external = agent.take_forces();
    let mut accel = agent.acceleration + (agent.body.thrust + external) / mass;
    if agent.body.gravity_affected {
        accel += world.gravity;
    }
    agent.acceleration = accel;
    agent.velocity += accel * dt;

    // ── Drag ──────────────────────────────────────────────────────────────
    let speed = agent.velocity.length();
    if speed > Vec3::EPSILON {
        let drag = 0.5 * world.constants.air_density * speed * speed
            * agent.body.drag_coefficient
            * agent.body.area
            / mass;
        // Drag can stop an agent but never reverse it.
        let dv = (drag * dt).min(speed);
        agent.velocity -= agent.velocity * (dv / speed);
    }

    agent.position += agent.velocity * dt;

    // ── Ground friction ───────────────────────────────────────────────────
    if agent.body.grounded {
        let horizontal = agent.velocity.horizontal();
        let h_speed = horizontal.length();
        if h_speed > Vec3::EPSILON {
            let friction = agent.body.friction_coefficient * world.gravity.length();
            let dv = (friction * dt).min(h_speed);
            agent.velocity -= horizontal * (dv / h_speed);
        }
    }

    let bounds_hits = apply_bounds_constraints(agent, &world.bounds);
    agent.acceleration = Vec3::ZERO;

    if !(agent.position.is_finite() && agent.velocity.is_finite()) {
        warn!(agent = %agent.id, "non-finite physics state, resetting");
        agent.position = world.bounds.clamp(if start.is_finite() { start } else { world.bounds.center() });
        agent.velocity = Vec3::ZERO;
        return StepOutcome { bounds_hits, reset: true };
    }
    StepOutcome { bounds_hits, reset: false }
}

/// Clamp an agent's position into `bounds`.
///
/// On each violated axis the velocity component, if it points outward, is
/// sign-flipped and scaled by the agent's restitution.  Touching the lower
/// Y face marks the agent grounded.  Returns the number of violated axes.
pub fn apply_bounds_constraints(agent: &mut Agent, bounds: &Bounds) -> usize {
    let violations = check_bounds(agent.position, 0.0, bounds);
    let restitution = agent.body.restitution.clamp(0.0, 1.0);
    let mut grounded = false;

    for v in &violations {
        let axis = v.axis;
        let vel = agent.velocity[axis];
        let (face, outward) = match v.side {
            BoundSide::Min => (bounds.min[axis], vel < 0.0),
            BoundSide::Max => (bounds.max[axis], vel > 0.0),
        };
        let floor = axis == Axis::Y && v.side == BoundSide::Min;
        agent.position[axis] = face;
        if outward {
            let reflected = -vel * restitution;
            agent.velocity[axis] = if floor && reflected.abs() < REST_SPEED { 0.0 } else { reflected };
        }
        grounded |= floor;
    }
    agent.body.grounded = grounded || touches_floor(agent, bounds);
    violations.len()
}

/// Resting exactly on the floor counts as ground contact.
fn touches_floor(agent: &Agent, bounds: &Bounds) -> bool {
    agent.position.y <= bounds.min.y + Vec3::EPSILON && agent.velocity.y <= 0.0
}
