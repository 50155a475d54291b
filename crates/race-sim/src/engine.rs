//! The `Simulation` struct and its tick loop.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing::{debug, info, warn};

use race_agent::{Agent, AgentConfig, AgentManager, IncidentCause, ManagerConfig};
use race_core::{AgentId, SimClock, SimConfig, SubscriptionId, Tick, World};
use race_events::{Event, EventBus, EventPayload, HandlerResult};
use race_leaderboard::{Leaderboard, RankedEntry};
use race_physics::PhysicsEngine;

use crate::{
    Ema, NoopObserver, Scenario, SimError, SimObserver, SimResult, SimState, SimStats, StopHandle,
    topics,
};

/// What happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick:             Tick,
    /// Delta time actually integrated, after clamping.
    pub dt:               f64,
    /// Simulated seconds at the end of the tick.
    pub time:             f64,
    pub collisions:       usize,
    /// Agents crashed by collisions this tick.
    pub crashes:          usize,
    pub decisions:        usize,
    pub laps:             usize,
    pub incidents:        usize,
    pub events_processed: usize,
    /// Wall-clock seconds spent in the five phases.
    pub work_secs:        f64,
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// One independent race.  Owns its agents, physics, event bus and
/// leaderboard; nothing is shared between instances.
///
/// Create via [`Simulation::new`] or [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    config:      SimConfig,
    state:       SimState,
    world:       World,
    clock:       SimClock,
    agents:      AgentManager,
    physics:     PhysicsEngine,
    bus:         EventBus,
    leaderboard: Leaderboard,
    tick_time:   Ema,
    frame_delta: Ema,
    stop_handle: StopHandle,
    started_at:  Option<Instant>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let world = World::default();
        Ok(Self {
            agents:      AgentManager::new(ManagerConfig::from_sim(&config, &world)),
            physics:     PhysicsEngine::from_config(&config)?,
            bus:         EventBus::new(config.event_queue_capacity),
            leaderboard: Leaderboard::new(config.leaderboard_history),
            tick_time:   Ema::new(config.stats_smoothing),
            frame_delta: Ema::new(config.stats_smoothing),
            state:       SimState::Idle,
            clock:       SimClock::new(),
            stop_handle: StopHandle::new(),
            started_at:  None,
            world,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Load world bounds and the starting roster.
    ///
    /// Fails without side effects on an over-capacity or malformed scenario.
    /// Re-initializing a stopped simulation resets the clock and roster but
    /// keeps event subscriptions.
    pub fn initialize(&mut self, scenario: &Scenario) -> SimResult<()> {
        if matches!(self.state, SimState::Running | SimState::Destroyed) {
            return Err(self.reject("initialize"));
        }
        let world = scenario
            .validate(self.config.max_agents, &self.world)
            .inspect_err(|e| warn!(error = %e, "initialization failed"))?;

        self.agents.clear();
        self.agents.set_world(&world);
        self.world = world;
        self.clock = SimClock::new();
        self.tick_time.reset();
        self.frame_delta.reset();
        self.leaderboard.clear_history();

        let ids = self.agents.initialize(&scenario.agents);
        self.leaderboard.update(self.agents.iter(), 0.0);
        self.state = SimState::Initialized;
        info!(
            agents = ids.len(),
            min = %self.world.bounds.min,
            max = %self.world.bounds.max,
            "simulation initialized"
        );
        Ok(())
    }

    /// Enter `Running`.  Returns `false` (and logs) if already running or
    /// not initialized.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, SimState::Initialized | SimState::Stopped) {
            self.reject("start");
            return false;
        }
        self.state = SimState::Running;
        self.started_at = Some(Instant::now());
        self.bus.set_time(self.clock.time_secs);
        self.bus.emit_immediate(
            topics::STARTED,
            json!({ "time": self.clock.time_secs, "agents": self.agents.len() }),
        );
        info!(tick = %self.clock.current_tick, agents = self.agents.len(), "simulation started");
        true
    }

    /// Leave `Running`, deliver whatever the last tick queued, then publish
    /// a final statistics snapshot.
    ///
    /// Idempotent: stopping a simulation that is not running is a logged
    /// no-op returning `false`.  A pending [`StopHandle`] request is consumed.
    pub fn stop(&mut self) -> bool {
        if self.state != SimState::Running {
            self.reject("stop");
            return false;
        }
        self.state = SimState::Stopped;
        self.stop_handle.reset();
        self.flush_events();

        let stats = self.get_stats();
        let payload = match serde_json::to_value(&stats) {
            Ok(value) => EventPayload::Custom(value),
            Err(e) => EventPayload::Warning { message: format!("stats snapshot unavailable: {e}") },
        };
        self.bus.emit_immediate(topics::STOPPED, payload);

        let wall = self.started_at.map_or(0.0, |t| t.elapsed().as_secs_f64());
        info!(
            clock = %self.clock,
            wall_secs = wall,
            avg_tick_ms = stats.average_tick_time_ms,
            "simulation stopped"
        );
        true
    }

    /// Release every agent, subscription and ranking.  Terminal.
    pub fn destroy(&mut self) {
        if self.state == SimState::Destroyed {
            warn!("destroy ignored: already destroyed");
            return;
        }
        if self.state == SimState::Running {
            self.stop();
        }
        self.flush_events();
        self.agents.clear();
        self.bus.clear();
        self.leaderboard = Leaderboard::empty(0);
        self.state = SimState::Destroyed;
        info!("simulation destroyed");
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Execute exactly one tick with the given delta time.
    ///
    /// Allowed while `Initialized` or `Running`.
    pub fn step(&mut self, dt: f64) -> SimResult<TickReport> {
        self.tick(dt, &mut NoopObserver)
    }

    /// Execute up to `n` ticks at the fixed target period without sleeping.
    ///
    /// Ends early if the simulation stops (e.g. `max_ticks`).  Returns the
    /// number of ticks executed.
    pub fn run_for<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<u64> {
        if !self.state.can_step() {
            return Err(self.reject("run"));
        }
        let dt = self.config.target_period_secs();
        let mut done = 0;
        while done < n && self.state.can_step() {
            self.tick(dt, observer)?;
            done += 1;
        }
        Ok(done)
    }

    /// Block the calling thread, ticking at the configured rate until
    /// [`stop`](Self::stop) is requested through a [`StopHandle`] or
    /// `max_ticks` is reached.
    ///
    /// Starts the simulation first if it is initialized or stopped.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if matches!(self.state, SimState::Initialized | SimState::Stopped) {
            self.start();
        }
        if self.state != SimState::Running {
            return Err(self.reject("run"));
        }

        let period_secs = self.config.target_period_secs();
        let period = Duration::try_from_secs_f64(period_secs).unwrap_or(Duration::ZERO);
        let mut last_frame: Option<Instant> = None;

        while self.state == SimState::Running {
            if self.stop_handle.is_stopped() {
                self.stop();
                break;
            }
            let frame_start = Instant::now();
            let dt = last_frame.map_or(period_secs, |t| frame_start.duration_since(t).as_secs_f64());
            last_frame = Some(frame_start);

            self.tick(dt, observer)?;

            if let Some(rest) = period.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        observer.on_stopped(&self.get_stats());
        Ok(())
    }

    /// A handle that stops [`run`](Self::run) from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn tick<O: SimObserver>(&mut self, dt: f64, observer: &mut O) -> SimResult<TickReport> {
        if !self.state.can_step() {
            return Err(self.reject("step"));
        }
        let work_start = Instant::now();
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_delta_secs) } else { 0.0 };

        observer.on_tick_start(self.clock.current_tick);
        self.clock.advance(dt);
        let now = self.clock.time_secs;
        self.bus.set_time(now);

        // ── Phase 1: physics and collision damage ─────────────────────────
        let collisions = self.physics.update(&mut self.agents, &self.world, dt);
        let mut crashes = 0;
        for c in &collisions {
            self.bus.emit(
                topics::COLLISION,
                EventPayload::Collision {
                    a:           c.a,
                    b:           c.b,
                    normal:      c.impact.normal,
                    penetration: c.impact.penetration,
                    point:       c.impact.point,
                    severity:    c.severity,
                },
            );
            for id in [c.a, c.b] {
                if self.agents.handle_collision(id, c.severity) == Some(true) {
                    crashes += 1;
                    self.bus.emit(
                        topics::INCIDENT,
                        EventPayload::Incident {
                            agent:    id,
                            severity: c.severity,
                            crashed:  true,
                            cause:    IncidentCause::Collision.to_string(),
                        },
                    );
                }
            }
        }

        // ── Phase 2: deliver queued events ────────────────────────────────
        let events_processed = self.bus.process_events();
        if let Some(fault) = self.bus.take_fault() {
            debug!(error = %fault, "subscriber fault isolated");
        }

        // ── Phase 3: AI and metrics ───────────────────────────────────────
        let update = self.agents.update(dt, now);
        for lap in &update.laps {
            self.bus.emit(
                topics::LAP_COMPLETE,
                EventPayload::LapComplete {
                    agent:         lap.agent,
                    lap:           lap.lap,
                    lap_time:      lap.lap_time,
                    best_lap_time: lap.best_lap_time,
                },
            );
        }
        for inc in &update.incidents {
            self.bus.emit(
                topics::INCIDENT,
                EventPayload::Incident {
                    agent:    inc.agent,
                    severity: inc.severity,
                    crashed:  inc.crashed,
                    cause:    inc.cause.to_string(),
                },
            );
        }

        // ── Phase 4: leaderboard ──────────────────────────────────────────
        self.leaderboard.update(self.agents.iter(), now);

        // ── Phase 5: stats ────────────────────────────────────────────────
        let work_secs = work_start.elapsed().as_secs_f64();
        self.tick_time.update(work_secs);
        if dt > 0.0 {
            self.frame_delta.update(dt);
        }

        let report = TickReport {
            tick: self.clock.current_tick,
            dt,
            time: now,
            collisions: collisions.len(),
            crashes,
            decisions: update.decisions,
            laps: update.laps.len(),
            incidents: update.incidents.len(),
            events_processed,
            work_secs,
        };
        observer.on_tick_end(report.tick, &report);

        if let Some(max) = self.config.max_ticks {
            if self.state == SimState::Running && self.clock.current_tick.0 >= max {
                info!(max_ticks = max, "tick limit reached");
                self.stop();
            }
        }
        Ok(report)
    }

    /// Deliver everything still queued on the bus.
    fn flush_events(&mut self) {
        let flushed = self.bus.process_events();
        if let Some(fault) = self.bus.take_fault() {
            debug!(error = %fault, "subscriber fault isolated");
        }
        if flushed > 0 {
            debug!(events = flushed, "flushed queued events");
        }
    }

    /// Log a wrong-state call, surface it on the bus and build the error.
    fn reject(&mut self, op: &'static str) -> SimError {
        warn!(op, state = %self.state, "call ignored in current state");
        if self.state != SimState::Destroyed {
            self.bus.emit(
                topics::WARNING,
                EventPayload::Warning { message: format!("cannot {op} while {}", self.state) },
            );
        }
        SimError::InvalidState { op, state: self.state }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Add an agent mid-race.  Rejected (with a warning) when the roster is
    /// full, the config is invalid or the start lies outside the world.
    pub fn add_agent(&mut self, cfg: &AgentConfig) -> SimResult<AgentId> {
        if self.state == SimState::Destroyed {
            return Err(self.reject("add agent"));
        }
        let result = if self.world.bounds.contains(cfg.position) {
            self.agents.add_agent(cfg).map_err(SimError::from)
        } else {
            Err(SimError::Scenario(format!("{} starts outside the world at {}", cfg.name, cfg.position)))
        };
        if let Err(e) = &result {
            warn!(agent = %cfg.name, error = %e, "agent rejected");
            self.bus.emit(topics::WARNING, EventPayload::Warning { message: e.to_string() });
        }
        result
    }

    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        self.agents.remove_agent(id)
    }

    /// Every stored agent in ascending id order, crashed ones included.
    pub fn get_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Mutable access for external collaborators, e.g. to `apply_force`.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn agents(&self) -> &AgentManager {
        &self.agents
    }

    // ── Rankings and stats ────────────────────────────────────────────────

    /// Standings for every criterion, truncated to `limit` when given.
    pub fn get_leaderboard(&self, limit: Option<usize>) -> BTreeMap<String, Vec<RankedEntry>> {
        self.leaderboard.all_standings(limit)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// For registering extra criteria.
    pub fn leaderboard_mut(&mut self) -> &mut Leaderboard {
        &mut self.leaderboard
    }

    pub fn get_stats(&self) -> SimStats {
        let bus = self.bus.stats();
        let physics = self.physics.stats();
        let delta = self.frame_delta.get();
        SimStats {
            current_time:         self.clock.time_secs,
            tick_count:           self.clock.current_tick.0,
            agents_total:         self.agents.len(),
            agents_active:        self.agents.active_count(),
            events_emitted:       bus.emitted,
            events_processed:     bus.processed,
            events_dropped:       bus.dropped,
            handler_faults:       bus.handler_faults,
            physics_updates:      physics.agent_updates,
            collisions:           physics.collisions,
            average_tick_time_ms: self.tick_time.get() * 1_000.0,
            fps:                  if delta > 0.0 { 1.0 / delta } else { 0.0 },
        }
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Subscribe to an event type (`"*"` for all) on the internal bus.
    pub fn on_event<F>(&mut self, event_type: &str, handler: F, priority: i32) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + Send + 'static,
    {
        self.bus.on(event_type, handler, priority)
    }

    pub fn off_event(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    /// Queue an event for delivery during the next tick's event phase.
    pub fn emit_event(&mut self, event_type: &str, payload: impl Into<EventPayload>) {
        self.bus.emit(event_type, payload);
    }

    /// Direct bus access, e.g. for namespaced subscriptions.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    // ── Configuration and inspection ──────────────────────────────────────

    /// Replace the world between runs.  Rejected while running.
    pub fn set_world(&mut self, world: World) -> SimResult<()> {
        if matches!(self.state, SimState::Running | SimState::Destroyed) {
            return Err(self.reject("set world"));
        }
        world.validate()?;
        self.agents.set_world(&world);
        self.world = world;
        Ok(())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }
}
