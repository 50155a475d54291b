//! Behavior modes and the read-only decision function.
//!
//! Behaviors form a closed set dispatched by `match`, so adding a mode is a
//! compile error everywhere a decision is made until it is handled.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use race_collision::ProximityIndex;
use race_core::{AgentId, Vec3};

use crate::{Agent, AgentError, AgentResult};

/// Distance at which a patrol waypoint counts as reached.
pub const WAYPOINT_TOLERANCE: f64 = 5.0;

// ── BehaviorMode ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BehaviorMode {
    /// Constant forward thrust along the current heading.
    #[default]
    Cruise,
    /// Forward thrust scaled by `1 + aggression`.
    Race,
    /// Thrust toward the target agent's position.
    Follow,
    /// Thrust toward the current waypoint, cycling on arrival.
    Patrol,
}

impl BehaviorMode {
    pub const ALL: [BehaviorMode; 4] = [
        BehaviorMode::Cruise,
        BehaviorMode::Race,
        BehaviorMode::Follow,
        BehaviorMode::Patrol,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorMode::Cruise => "cruise",
            BehaviorMode::Race => "race",
            BehaviorMode::Follow => "follow",
            BehaviorMode::Patrol => "patrol",
        }
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorMode {
    type Err = AgentError;

    fn from_str(s: &str) -> AgentResult<Self> {
        let s = s.trim();
        BehaviorMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AgentError::Parse(format!("unknown behavior `{s}`")))
    }
}

// ── Decision ──────────────────────────────────────────────────────────────────

/// Read-only view handed to [`decide`].
pub struct DecisionContext<'a> {
    pub time: f64,
    /// Agent slots indexed by `AgentId`; `None` marks a removed agent.
    pub slots: &'a [Option<Agent>],
    /// Positions of every participating agent, for sensor queries.
    pub proximity: &'a ProximityIndex,
}

impl DecisionContext<'_> {
    fn live(&self, id: AgentId) -> Option<&Agent> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .filter(|a| a.is_participating())
    }
}

/// The outcome of one AI decision, applied by the manager in id order.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub agent: AgentId,
    pub thrust: Vec3,
    pub heading: f64,
    pub target: Option<AgentId>,
    pub waypoint_index: usize,
}

impl Decision {
    fn hold(agent: &Agent) -> Self {
        Self {
            agent:          agent.id,
            thrust:         Vec3::ZERO,
            heading:        agent.heading(),
            target:         agent.ai.target,
            waypoint_index: agent.ai.waypoint_index,
        }
    }

    /// Turn toward `goal` by at most `max_turn` and thrust along the new
    /// heading, keeping the vertical component of the goal direction.
    fn steer_toward(&mut self, agent: &Agent, goal: Vec3, max_turn: f64, thrust: f64) {
        let desired = goal - agent.position;
        let horizontal = desired.horizontal().length();
        if horizontal > Vec3::EPSILON {
            let wanted = desired.z.atan2(desired.x);
            self.heading = turn_toward(self.heading, wanted, max_turn);
        }
        let dir = Vec3::new(
            self.heading.cos() * horizontal,
            desired.y,
            self.heading.sin() * horizontal,
        );
        self.thrust = dir.normalize_or_zero() * thrust;
    }
}

/// Compute one agent's decision.  Pure with respect to world state.
pub fn decide(agent: &Agent, ctx: &DecisionContext<'_>) -> Decision {
    let elapsed = agent
        .ai
        .last_decision
        .map_or(agent.ai.decision_interval, |t| (ctx.time - t).max(0.0));
    let max_turn = agent.traits.turning_rate * elapsed;
    let base = agent.traits.acceleration * agent.body.mass;

    let mut d = Decision::hold(agent);
    match agent.ai.mode {
        BehaviorMode::Cruise => d.thrust = agent.forward() * base,
        BehaviorMode::Race => d.thrust = agent.forward() * (base * (1.0 + agent.traits.aggression)),
        BehaviorMode::Follow => match resolve_target(agent, ctx) {
            Some((target, goal)) => {
                d.target = Some(target);
                d.steer_toward(agent, goal, max_turn, base);
            }
            None => {
                d.target = None;
                d.thrust = agent.forward() * base;
            }
        },
        BehaviorMode::Patrol => {
            let waypoints = &agent.ai.waypoints;
            if waypoints.is_empty() {
                d.thrust = agent.forward() * base;
            } else {
                let mut idx = agent.ai.waypoint_index % waypoints.len();
                if agent.position.distance(waypoints[idx]) <= WAYPOINT_TOLERANCE {
                    idx = (idx + 1) % waypoints.len();
                }
                d.waypoint_index = idx;
                d.steer_toward(agent, waypoints[idx], max_turn, base);
            }
        }
    }

    if agent.speed() >= agent.traits.max_speed {
        d.thrust = Vec3::ZERO;
    }
    d
}

/// Keep a live target, otherwise acquire the nearest agent in sensor range.
fn resolve_target(agent: &Agent, ctx: &DecisionContext<'_>) -> Option<(AgentId, Vec3)> {
    if let Some(id) = agent.ai.target.filter(|&t| t != agent.id) {
        match ctx.live(id) {
            Some(target) => return Some((id, target.position)),
            None => debug!(agent = %agent.id, target = %id, "follow target lost"),
        }
    }
    let id = ctx
        .proximity
        .nearest_within(agent.position, agent.traits.sensor_range, agent.id)?;
    ctx.live(id).map(|t| (id, t.position))
}

/// Rotate `current` toward `wanted` along the shorter arc, by at most `max_turn`.
pub(crate) fn turn_toward(current: f64, wanted: f64, max_turn: f64) -> f64 {
    let mut diff = (wanted - current) % TAU;
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }
    let step = diff.clamp(-max_turn.max(0.0), max_turn.max(0.0));
    (current + step) % TAU
}
