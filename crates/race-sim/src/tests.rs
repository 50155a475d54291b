//! Unit tests for race-sim.

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use race_events::Event;

#[cfg(test)]
fn recorder(sim: &mut crate::Simulation, event_type: &str) -> Arc<Mutex<Vec<Event>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    sim.on_event(
        event_type,
        move |e: &Event| {
            sink.lock().unwrap().push(e.clone());
            Ok(())
        },
        0,
    );
    log
}

/// Deterministic test config: no random incidents.
#[cfg(test)]
fn calm() -> race_core::SimConfig {
    race_core::SimConfig { incident_rate: 0.0, ..race_core::SimConfig::default() }
}

/// A weightless, dragless, AI-less agent at `x` moving at `vx`.
#[cfg(test)]
fn coaster(name: &str, x: f64, vx: f64) -> race_agent::AgentConfig {
    race_agent::AgentConfig {
        name: name.into(),
        position: race_core::Vec3::new(x, 50.0, 0.0),
        velocity: race_core::Vec3::new(vx, 0.0, 0.0),
        drag_coefficient: Some(0.0),
        gravity_affected: false,
        ai_enabled: false,
        ..race_agent::AgentConfig::default()
    }
}

#[cfg(test)]
fn head_on() -> crate::Scenario {
    crate::Scenario::default().with_agents(vec![coaster("a", 0.0, 10.0), coaster("b", 3.0, -10.0)])
}

#[cfg(test)]
mod lifecycle {
    use race_core::SimConfig;

    use super::{calm, coaster, head_on};
    use crate::{Scenario, SimError, SimState, Simulation};

    #[test]
    fn full_state_machine() {
        let mut sim = Simulation::new(calm()).unwrap();
        assert_eq!(sim.state(), SimState::Idle);
        assert!(!sim.start(), "cannot start before initialize");

        sim.initialize(&head_on()).unwrap();
        assert_eq!(sim.state(), SimState::Initialized);

        assert!(sim.start());
        assert!(!sim.start(), "second start is a no-op");
        assert_eq!(sim.state(), SimState::Running);

        assert!(sim.stop());
        assert!(!sim.stop(), "stop is idempotent");
        assert_eq!(sim.state(), SimState::Stopped);

        assert!(sim.start(), "a stopped simulation can resume");
        sim.destroy();
        assert_eq!(sim.state(), SimState::Destroyed);
        sim.destroy();
        assert!(sim.initialize(&head_on()).is_err());
        assert!(!sim.start());
        assert_eq!(sim.get_agents().count(), 0);
    }

    #[test]
    fn over_capacity_scenario_fails_cleanly() {
        let mut sim = Simulation::new(SimConfig { max_agents: 1, ..calm() }).unwrap();
        let err = sim.initialize(&head_on()).unwrap_err();
        assert!(matches!(err, SimError::Capacity { requested: 2, max: 1 }));
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.get_agents().count(), 0);
    }

    #[test]
    fn malformed_scenarios_are_rejected() {
        let mut sim = Simulation::new(calm()).unwrap();
        let inverted = Scenario::new(race_core::Vec3::splat(10.0), race_core::Vec3::splat(-10.0));
        assert!(sim.initialize(&inverted).is_err());

        let outside = Scenario::default().with_agents(vec![coaster("lost", 9_000.0, 0.0)]);
        assert!(sim.initialize(&outside).is_err());

        let bad_lap = Scenario::default().with_lap_length(-1.0);
        assert!(sim.initialize(&bad_lap).is_err());
        assert_eq!(sim.state(), SimState::Idle);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(Simulation::new(SimConfig { tick_rate_hz: 0.0, ..calm() }).is_err());
        assert!(Simulation::new(SimConfig { crash_speed: -1.0, ..calm() }).is_err());
    }

    #[test]
    fn step_requires_initialization() {
        let mut sim = Simulation::new(calm()).unwrap();
        assert!(matches!(sim.step(0.1), Err(SimError::InvalidState { .. })));
        sim.initialize(&head_on()).unwrap();
        assert!(sim.step(0.1).is_ok());
    }

    #[test]
    fn add_and_remove_agents() {
        let mut sim = Simulation::new(SimConfig { max_agents: 2, ..calm() }).unwrap();
        sim.initialize(&Scenario::default()).unwrap();
        let a = sim.add_agent(&coaster("a", 0.0, 0.0)).unwrap();
        sim.add_agent(&coaster("b", 10.0, 0.0)).unwrap();
        assert!(sim.add_agent(&coaster("c", 20.0, 0.0)).is_err());
        assert!(sim.add_agent(&coaster("far", 1e6, 0.0)).is_err());

        assert!(sim.remove_agent(a));
        assert!(!sim.remove_agent(a));
        assert!(sim.agent(a).is_none());
        assert_eq!(sim.get_agents().count(), 1);
    }
}

#[cfg(test)]
mod ticking {
    use approx::assert_relative_eq;
    use race_core::{AgentId, SimConfig};

    use super::{calm, coaster, head_on};
    use crate::{NoopObserver, Scenario, SimState, Simulation};

    #[test]
    fn delta_time_is_clamped() {
        let mut sim = Simulation::new(calm()).unwrap();
        sim.initialize(&head_on()).unwrap();
        assert_eq!(sim.step(5.0).unwrap().dt, 0.1);
        assert_eq!(sim.step(-1.0).unwrap().dt, 0.0);
        assert_eq!(sim.clock().current_tick.0, 2);
    }

    #[test]
    fn stats_track_ticks_and_updates() {
        let mut sim = Simulation::new(calm()).unwrap();
        sim.initialize(&head_on()).unwrap();
        for _ in 0..10 {
            sim.step(0.05).unwrap();
        }
        let stats = sim.get_stats();
        assert_eq!(stats.tick_count, 10);
        assert_relative_eq!(stats.current_time, 0.5, epsilon = 1e-12);
        assert_relative_eq!(stats.fps, 20.0, epsilon = 1e-9);
        assert_eq!(stats.physics_updates, 20);
        assert_eq!(stats.agents_active, 2);
        assert!(stats.average_tick_time_ms >= 0.0);
    }

    #[test]
    fn leaderboard_reflects_this_ticks_physics() {
        let scenario = Scenario::default()
            .with_agents(vec![coaster("slow", 0.0, 5.0), coaster("fast", 100.0, 20.0)]);
        let mut sim = Simulation::new(calm()).unwrap();
        sim.initialize(&scenario).unwrap();
        sim.step(0.1).unwrap();

        let board = sim.get_leaderboard(Some(1));
        assert_eq!(board.len(), 4);
        assert_eq!(board["distance"][0].agent, AgentId(1));
        assert_relative_eq!(board["speed"][0].value, 20.0);
        assert_eq!(sim.leaderboard().get_agent_rank("speed", AgentId(0)), Some(2));
    }

    #[test]
    fn max_ticks_stops_the_run() {
        let mut sim = Simulation::new(SimConfig { max_ticks: Some(5), ..calm() }).unwrap();
        sim.initialize(&head_on()).unwrap();
        sim.start();
        let ran = sim.run_for(100, &mut NoopObserver).unwrap();
        assert_eq!(ran, 5);
        assert_eq!(sim.state(), SimState::Stopped);
    }

    #[test]
    fn collisions_damage_both_agents() {
        let mut sim = Simulation::new(calm()).unwrap();
        sim.initialize(&head_on()).unwrap();
        let report = sim.step(0.01).unwrap();
        assert_eq!(report.collisions, 1);
        assert_eq!(report.crashes, 0);
        for id in [AgentId(0), AgentId(1)] {
            assert_eq!(sim.agent(id).unwrap().metrics.collisions, 1);
        }
    }

    #[test]
    fn hard_collisions_crash_agents_out_of_the_ranking() {
        let mut sim = Simulation::new(SimConfig { crash_speed: 1.0, ..calm() }).unwrap();
        sim.initialize(&head_on()).unwrap();
        let report = sim.step(0.01).unwrap();
        assert_eq!(report.crashes, 2);
        assert_eq!(sim.get_stats().agents_active, 0);
        assert_eq!(sim.get_agents().count(), 2, "crashed agents stay addressable");
        assert!(sim.leaderboard().get_standings("distance", None).unwrap().is_empty());
    }

    #[test]
    fn identical_seeds_give_identical_races() {
        let race = || {
            let config = SimConfig { incident_rate: 2.0, seed: 99, ..SimConfig::default() };
            let agents = (0..6u32)
                .map(|i| race_agent::AgentConfig {
                    name: format!("car{i}"),
                    position: race_core::Vec3::new(f64::from(i) * 8.0, 0.0, 0.0),
                    aggression: 0.9,
                    behavior: race_agent::BehaviorMode::Race,
                    ..race_agent::AgentConfig::default()
                })
                .collect();
            let mut sim = Simulation::new(config).unwrap();
            sim.initialize(&Scenario::default().with_agents(agents).with_lap_length(40.0)).unwrap();
            sim.run_for(300, &mut NoopObserver).unwrap();
            sim.get_agents()
                .map(|a| (a.position, a.velocity, a.alive, a.metrics.incidents, a.metrics.laps))
                .collect::<Vec<_>>()
        };
        assert_eq!(race(), race());
    }
}

#[cfg(test)]
mod events {
    use race_events::{EventPayload, HandlerError};

    use super::{calm, coaster, head_on, recorder};
    use crate::{Scenario, Simulation, topics};

    #[test]
    fn start_and_stop_are_announced_immediately() {
        let mut sim = Simulation::new(calm()).unwrap();
        let started = recorder(&mut sim, topics::STARTED);
        let stopped = recorder(&mut sim, topics::STOPPED);
        sim.initialize(&head_on()).unwrap();

        sim.start();
        assert_eq!(started.lock().unwrap().len(), 1);

        sim.step(0.1).unwrap();
        sim.step(0.1).unwrap();
        sim.stop();
        let log = stopped.lock().unwrap();
        assert_eq!(log.len(), 1);
        match &log[0].payload {
            EventPayload::Custom(stats) => assert_eq!(stats["tick_count"], 2),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn collision_events_are_delivered_in_the_same_tick() {
        let mut sim = Simulation::new(calm()).unwrap();
        let hits = recorder(&mut sim, topics::COLLISION);
        sim.initialize(&head_on()).unwrap();
        sim.step(0.01).unwrap();

        let log = hits.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert!(matches!(log[0].payload, EventPayload::Collision { severity, .. } if severity > 0.0));
        assert!(log[0].timestamp > 0.0);
    }

    #[test]
    fn lap_events_arrive_on_the_following_tick() {
        let mut sim = Simulation::new(calm()).unwrap();
        let laps = recorder(&mut sim, topics::LAP_COMPLETE);
        let scenario = Scenario::default().with_agents(vec![coaster("solo", 0.0, 10.0)]).with_lap_length(0.5);
        sim.initialize(&scenario).unwrap();

        sim.step(0.1).unwrap();
        assert!(laps.lock().unwrap().is_empty());
        sim.step(0.1).unwrap();
        let log = laps.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert!(matches!(log[0].payload, EventPayload::LapComplete { lap: 1, .. }));
    }

    #[test]
    fn final_tick_events_are_delivered_before_stopping() {
        let config = race_core::SimConfig { max_ticks: Some(1), ..calm() };
        let mut sim = Simulation::new(config).unwrap();
        let laps = recorder(&mut sim, topics::LAP_COMPLETE);
        let everything = recorder(&mut sim, race_events::WILDCARD);
        let scenario = Scenario::default().with_agents(vec![coaster("solo", 0.0, 10.0)]).with_lap_length(0.1);
        sim.initialize(&scenario).unwrap();

        sim.start();
        assert_eq!(sim.run_for(10, &mut crate::NoopObserver).unwrap(), 1);
        assert_eq!(sim.state(), crate::SimState::Stopped);
        assert_eq!(laps.lock().unwrap().len(), 1);
        assert_eq!(sim.bus_mut().queue_len(), 0);

        let order: Vec<_> = everything.lock().unwrap().iter().map(|e| e.event_type.clone()).collect();
        assert_eq!(order, [topics::STARTED, topics::LAP_COMPLETE, topics::STOPPED]);
    }

    #[test]
    fn destroy_delivers_queued_events_first() {
        let mut sim = Simulation::new(calm()).unwrap();
        let laps = recorder(&mut sim, topics::LAP_COMPLETE);
        let scenario = Scenario::default().with_agents(vec![coaster("solo", 0.0, 10.0)]).with_lap_length(0.5);
        sim.initialize(&scenario).unwrap();

        sim.step(0.1).unwrap();
        assert!(laps.lock().unwrap().is_empty());
        sim.destroy();
        assert_eq!(laps.lock().unwrap().len(), 1);
    }

    #[test]
    fn crashes_emit_incidents() {
        let mut sim = Simulation::new(race_core::SimConfig { crash_speed: 1.0, ..calm() }).unwrap();
        let incidents = recorder(&mut sim, topics::INCIDENT);
        sim.initialize(&head_on()).unwrap();
        sim.step(0.01).unwrap();

        let log = incidents.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| matches!(
            &e.payload,
            EventPayload::Incident { crashed: true, cause, .. } if cause == "collision"
        )));
    }

    #[test]
    fn faulty_subscribers_do_not_halt_the_loop() {
        let mut sim = Simulation::new(calm()).unwrap();
        sim.on_event(topics::COLLISION, |_| Err(HandlerError::from("boom")), 10);
        let hits = recorder(&mut sim, topics::COLLISION);
        sim.initialize(&head_on()).unwrap();

        assert!(sim.step(0.01).is_ok());
        assert!(sim.step(0.01).is_ok());
        assert_eq!(hits.lock().unwrap().len(), 1);
        assert_eq!(sim.get_stats().handler_faults, 1);
    }

    #[test]
    fn external_events_and_warnings_pass_through() {
        let mut sim = Simulation::new(calm()).unwrap();
        let custom = recorder(&mut sim, "dashboard:ping");
        let warnings = recorder(&mut sim, topics::WARNING);

        sim.stop();
        sim.initialize(&Scenario::default().with_agents(vec![coaster("a", 0.0, 0.0)])).unwrap();
        sim.emit_event("dashboard:ping", serde_json::json!({ "n": 1 }));
        assert!(custom.lock().unwrap().is_empty(), "emit_event queues");

        sim.step(0.1).unwrap();
        assert_eq!(custom.lock().unwrap().len(), 1);
        assert_eq!(warnings.lock().unwrap().len(), 1);
    }
}

#[cfg(test)]
mod run_loop {
    use std::thread;
    use std::time::Duration;

    use race_core::{SimConfig, Tick};

    use super::{calm, head_on};
    use crate::{SimObserver, SimState, SimStats, Simulation, TickReport};

    #[derive(Default)]
    struct Counter {
        starts:  u64,
        ends:    u64,
        stopped: Option<u64>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {
            self.ends += 1;
        }
        fn on_stopped(&mut self, stats: &SimStats) {
            self.stopped = Some(stats.tick_count);
        }
    }

    #[test]
    fn run_honours_max_ticks() {
        let config = SimConfig { tick_rate_hz: 1_000.0, max_ticks: Some(3), ..calm() };
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize(&head_on()).unwrap();

        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(sim.state(), SimState::Stopped);
        assert_eq!((obs.starts, obs.ends, obs.stopped), (3, 3, Some(3)));
    }

    #[test]
    fn stop_handle_ends_a_blocking_run() {
        let config = SimConfig { tick_rate_hz: 500.0, ..calm() };
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize(&head_on()).unwrap();

        let handle = sim.stop_handle();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            handle.stop();
        });

        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();
        stopper.join().unwrap();

        assert_eq!(sim.state(), SimState::Stopped);
        assert!(obs.ends > 0);
        assert_eq!(obs.stopped, Some(obs.ends));
    }

    #[test]
    fn stop_requested_before_run_prevents_every_tick() {
        let config = SimConfig { tick_rate_hz: 1_000.0, max_ticks: Some(20), ..calm() };
        let mut sim = Simulation::new(config).unwrap();
        sim.initialize(&head_on()).unwrap();

        let handle = sim.stop_handle();
        handle.stop();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(sim.state(), SimState::Stopped);
        assert_eq!((obs.ends, obs.stopped), (0, Some(0)));
        assert!(!handle.is_stopped(), "the request is consumed by the stop");

        let mut again = Counter::default();
        sim.run(&mut again).unwrap();
        assert_eq!(again.ends, 20);
    }

    #[test]
    fn run_refuses_when_idle() {
        let mut sim = Simulation::new(calm()).unwrap();
        assert!(sim.run(&mut Counter::default()).is_err());
    }
}

#[cfg(test)]
mod stats {
    use approx::assert_relative_eq;

    use crate::Ema;

    #[test]
    fn first_sample_seeds_then_smooths() {
        let mut ema = Ema::new(0.5);
        assert_eq!(ema.get(), 0.0);
        assert_eq!(ema.update(10.0), 10.0);
        assert_relative_eq!(ema.update(20.0), 15.0);
        assert_relative_eq!(ema.update(f64::NAN), 15.0);
        ema.reset();
        assert_eq!(ema.get(), 0.0);
    }
}
