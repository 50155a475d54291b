//! `race-physics`: the physics engine.
//!
//! Per tick, [`PhysicsEngine::update`]:
//!
//! 1. integrates every participating agent ([`update_agent_physics`]):
//!    gravity, thrust and queued forces into acceleration, `v += a·dt`,
//!    quadratic drag, `p += v·dt`, ground friction, then
//!    [`apply_bounds_constraints`];
//! 2. snapshots the agents into `CollisionBody`s and runs the
//!    `CollisionDetector`;
//! 3. resolves every overlapping pair with an impulse
//!    ([`resolve_collision`]) and grades it by closing speed.
//!
//! Only agents that are both active and alive take part.

pub mod engine;
pub mod error;
pub mod integrate;
pub mod resolve;

#[cfg(test)]
mod tests;

pub use engine::{PhysicsEngine, PhysicsStats, ResolvedCollision};
pub use error::{PhysicsError, PhysicsResult};
pub use integrate::{REST_SPEED, StepOutcome, apply_bounds_constraints, update_agent_physics};
pub use resolve::{Resolution, resolve_collision};
