//! `AgentManager`: exclusive owner of every agent in one simulation.
//!
//! Agents live in a slot vector indexed by `AgentId`.  Ids are handed out
//! monotonically and never reused; removing an agent empties its slot, so a
//! stale id (a follow target, a queued event) resolves to `None` instead of
//! aliasing a newer agent.

use tracing::{debug, warn};

use race_collision::{CollisionBody, ProximityIndex};
use race_core::{AgentId, PhysicsConstants, SimConfig, World};

use crate::behavior::{BehaviorMode, Decision, DecisionContext, decide};
use crate::report::{IncidentCause, IncidentRecord, LapRecord, UpdateReport};
use crate::{Agent, AgentConfig, AgentError, AgentResult};

// ── ManagerConfig ─────────────────────────────────────────────────────────────

/// Manager-level tuning, usually derived from `SimConfig` and `World`.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerConfig {
    pub max_agents: usize,
    pub seed: u64,
    /// Severity at or above which a collision or incident crashes an agent.
    pub crash_threshold: f64,
    /// Random incidents per second at aggression 1.0.
    pub incident_rate: f64,
    /// Track length per lap; `None` disables lap timing.
    pub lap_length: Option<f64>,
    /// Defaults for physical coefficients a config leaves unset.
    pub constants: PhysicsConstants,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::from_sim(&SimConfig::default(), &World::default())
    }
}

impl ManagerConfig {
    pub fn from_sim(config: &SimConfig, world: &World) -> Self {
        Self {
            max_agents:      config.max_agents,
            seed:            config.seed,
            crash_threshold: config.crash_threshold,
            incident_rate:   config.incident_rate,
            lap_length:      world.lap_length,
            constants:       world.constants,
        }
    }
}

// ── AgentManager ──────────────────────────────────────────────────────────────

pub struct AgentManager {
    slots: Vec<Option<Agent>>,
    live: usize,
    config: ManagerConfig,
}

impl AgentManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self { slots: Vec::new(), live: 0, config }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Apply a new world (lap length, physics defaults) to future agents and
    /// lap checks.
    pub fn set_world(&mut self, world: &World) {
        self.config.lap_length = world.lap_length;
        self.config.constants = world.constants;
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Bulk-construct agents.  Configs that are invalid or exceed the
    /// capacity cap are skipped with a warning.
    pub fn initialize(&mut self, configs: &[AgentConfig]) -> Vec<AgentId> {
        let mut ids = Vec::with_capacity(configs.len().min(self.config.max_agents));
        for cfg in configs {
            match self.add_agent(cfg) {
                Ok(id) => ids.push(id),
                Err(e) => warn!(agent = %cfg.name, error = %e, "skipping agent"),
            }
        }
        ids
    }

    /// Construct one agent.  Fails on an invalid config or a full roster.
    pub fn add_agent(&mut self, cfg: &AgentConfig) -> AgentResult<AgentId> {
        if self.live >= self.config.max_agents {
            return Err(AgentError::CapacityExceeded { max: self.config.max_agents });
        }
        cfg.validate()?;

        let raw = u32::try_from(self.slots.len())
            .ok()
            .filter(|&n| n != AgentId::INVALID.0)
            .ok_or(AgentError::CapacityExceeded { max: self.config.max_agents })?;
        let id = AgentId(raw);

        let agent = Agent::from_config(id, cfg, &self.config.constants, self.config.seed);
        debug!(agent = %id, name = %agent.name, kind = %agent.kind, "agent added");
        self.slots.push(Some(agent));
        self.live += 1;
        Ok(id)
    }

    /// Detach and finalize an agent.  Returns whether it existed.
    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(agent) => {
                self.live -= 1;
                debug!(
                    agent = %id,
                    distance = agent.metrics.distance,
                    laps = agent.metrics.laps,
                    collisions = agent.metrics.collisions,
                    "agent removed"
                );
                true
            }
            None => false,
        }
    }

    /// Remove every agent.  Ids already handed out stay retired.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.live = 0;
    }

    /// Include or exclude an agent from updates and ranking.
    pub fn set_active(&mut self, id: AgentId, active: bool) -> bool {
        match self.get_mut(id) {
            Some(agent) => {
                agent.active = active;
                true
            }
            None => false,
        }
    }

    // ── Access ────────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Mutable access to two distinct agents at once.
    pub fn get_pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia.max(ib) >= self.slots.len() {
            return None;
        }
        let (lo, hi) = (ia.min(ib), ia.max(ib));
        let (left, right) = self.slots.split_at_mut(hi);
        let lo_agent = left[lo].as_mut()?;
        let hi_agent = right[0].as_mut()?;
        if ia < ib {
            Some((lo_agent, hi_agent))
        } else {
            Some((hi_agent, lo_agent))
        }
    }

    /// All agents in ascending id order, alive or not.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.slots.iter_mut().flatten()
    }

    /// Active and alive agents in ascending id order.
    pub fn participating(&self) -> impl Iterator<Item = &Agent> {
        self.iter().filter(|a| a.is_participating())
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|a| a.id).collect()
    }

    /// Raw slot view, indexed by `AgentId`.
    pub fn slots(&self) -> &[Option<Agent>] {
        &self.slots
    }

    /// Number of agents currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn active_count(&self) -> usize {
        self.participating().count()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_agents
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// AI decisions for every due agent, then metrics, laps and random
    /// incidents.
    pub fn update(&mut self, dt: f64, sim_time: f64) -> UpdateReport {
        let mut report = UpdateReport::default();

        // ── Phase 1: decide (read-only) ───────────────────────────────────
        let decisions = self.decide_all(sim_time);
        report.decisions = decisions.len();

        // ── Phase 2: apply in ascending AgentId order ─────────────────────
        for d in decisions {
            if let Some(agent) = self.get_mut(d.agent) {
                agent.body.thrust = d.thrust;
                agent.rotation.y = d.heading;
                agent.ai.target = d.target;
                agent.ai.waypoint_index = d.waypoint_index;
                agent.ai.last_decision = Some(sim_time);
            }
        }

        // ── Phase 3: metrics, laps, incidents ─────────────────────────────
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let lap_length = self.config.lap_length.filter(|l| l.is_finite() && *l > 0.0);
        let incident_rate = self.config.incident_rate;
        let crash_threshold = self.config.crash_threshold;

        for agent in self.slots.iter_mut().flatten() {
            if !agent.is_participating() {
                continue;
            }
            let step = agent.speed() * dt;
            accumulate_metrics(agent, step);

            if let Some(length) = lap_length {
                if let Some(lap) = check_lap(agent, length, sim_time) {
                    report.laps.push(lap);
                }
            }

            if incident_rate > 0.0 {
                let p = incident_rate * agent.traits.aggression * dt;
                if agent.rng_mut().gen_bool(p) {
                    let severity = agent.rng_mut().unit();
                    let pick = agent.rng_mut().gen_range(0..IncidentCause::RANDOM.len());
                    let cause = IncidentCause::RANDOM[pick];
                    let crashed = apply_incident(agent, severity, crash_threshold);
                    report.incidents.push(IncidentRecord { agent: agent.id, severity, crashed, cause });
                }
            }
        }
        report
    }

    fn decide_all(&self, sim_time: f64) -> Vec<Decision> {
        let due = |a: &&Agent| a.is_participating() && a.ai.enabled && a.ai.is_due(sim_time);

        let needs_sensors = self
            .iter()
            .filter(due)
            .any(|a| a.ai.mode == BehaviorMode::Follow);
        let bodies: Vec<CollisionBody> = if needs_sensors {
            self.participating()
                .map(|a| CollisionBody::new(a.id, a.position, a.body.radius))
                .collect()
        } else {
            Vec::new()
        };
        let proximity = ProximityIndex::build(&bodies);
        let ctx = DecisionContext { time: sim_time, slots: &self.slots, proximity: &proximity };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.slots
                .par_iter()
                .filter_map(Option::as_ref)
                .filter(due)
                .map(|a| decide(a, &ctx))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.iter().filter(due).map(|a| decide(a, &ctx)).collect()
        }
    }

    // ── Damage ────────────────────────────────────────────────────────────

    /// Apply collision damage.  Returns `Some(crashed)`, or `None` for an
    /// unknown or already crashed agent.
    pub fn handle_collision(&mut self, id: AgentId, severity: f64) -> Option<bool> {
        let threshold = self.config.crash_threshold;
        let agent = self.get_mut(id).filter(|a| a.alive)?;
        let severity = clamp_severity(severity);

        agent.metrics.collisions += 1;
        agent.velocity *= 1.0 - 0.5 * severity;
        agent.traits.max_speed *= 1.0 - 0.1 * severity;

        let crashed = severity >= threshold;
        if crashed {
            agent.metrics.incidents += 1;
            agent.crash();
            warn!(agent = %id, severity, "agent crashed in collision");
        }
        Some(crashed)
    }

    /// Apply an externally reported incident.
    pub fn handle_incident(
        &mut self,
        id: AgentId,
        severity: f64,
        cause: IncidentCause,
    ) -> Option<IncidentRecord> {
        let threshold = self.config.crash_threshold;
        let agent = self.get_mut(id).filter(|a| a.alive)?;
        let severity = clamp_severity(severity);
        let crashed = apply_incident(agent, severity, threshold);
        Some(IncidentRecord { agent: id, severity, crashed, cause })
    }
}

impl Default for AgentManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn clamp_severity(severity: f64) -> f64 {
    if severity.is_nan() { 0.0 } else { severity.clamp(0.0, 1.0) }
}

/// Distance, fuel and efficiency for one step of `step` distance units.
pub(crate) fn accumulate_metrics(agent: &mut Agent, step: f64) {
    let efficiency = agent.traits.fuel_efficiency.clamp(0.0, 1.0);
    agent.metrics.distance += step;
    agent.metrics.fuel_consumed += step * (1.0 - efficiency);
    agent.metrics.recompute_efficiency();
}

fn check_lap(agent: &mut Agent, length: f64, sim_time: f64) -> Option<LapRecord> {
    let m = &mut agent.metrics;
    if m.distance < length * f64::from(m.laps + 1) {
        return None;
    }
    let lap_time = sim_time - m.lap_start;
    let best = m.best_lap_time.map_or(lap_time, |b| b.min(lap_time));
    m.laps += 1;
    m.lap_time = Some(lap_time);
    m.best_lap_time = Some(best);
    m.lap_start = sim_time;
    Some(LapRecord { agent: agent.id, lap: m.laps, lap_time, best_lap_time: best })
}

fn apply_incident(agent: &mut Agent, severity: f64, crash_threshold: f64) -> bool {
    agent.metrics.incidents += 1;
    agent.velocity *= 1.0 - 0.5 * severity;
    agent.traits.acceleration *= 1.0 - 0.2 * severity;

    if severity >= crash_threshold {
        agent.crash();
        warn!(agent = %agent.id, severity, "agent crashed after incident");
        true
    } else {
        false
    }
}
