//! Unit tests for race-physics.

#[cfg(test)]
fn agent(id: u32, cfg: race_agent::AgentConfig) -> race_agent::Agent {
    race_agent::Agent::from_config(race_core::AgentId(id), &cfg, &race_core::PhysicsConstants::default(), 7)
}

/// A frictionless, dragless, weightless body for isolating one effect.
#[cfg(test)]
fn inert(position: race_core::Vec3, velocity: race_core::Vec3) -> race_agent::AgentConfig {
    race_agent::AgentConfig {
        position,
        velocity,
        drag_coefficient: Some(0.0),
        gravity_affected: false,
        ai_enabled: false,
        ..race_agent::AgentConfig::default()
    }
}

#[cfg(test)]
mod integrate {
    use approx::assert_relative_eq;
    use race_agent::AgentConfig;
    use race_core::{Vec3, World};

    use super::{agent, inert};
    use crate::{REST_SPEED, apply_bounds_constraints, update_agent_physics};

    #[test]
    fn free_fall_under_gravity() {
        let world = World::default();
        let mut a = agent(0, AgentConfig { gravity_affected: true, ..inert(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO) });
        update_agent_physics(&mut a, &world, 0.1);
        assert_relative_eq!(a.velocity.y, -0.981, epsilon = 1e-12);
        assert_relative_eq!(a.position.y, 50.0 - 0.0981, epsilon = 1e-12);
        assert_eq!(a.acceleration, Vec3::ZERO, "acceleration is reset after each step");
    }

    #[test]
    fn thrust_is_divided_by_mass() {
        let world = World::default();
        let mut a = agent(0, AgentConfig { mass: 100.0, ..inert(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO) });
        a.body.thrust = Vec3::new(1000.0, 0.0, 0.0);
        update_agent_physics(&mut a, &world, 0.5);
        assert_relative_eq!(a.velocity.x, 5.0);
        assert_relative_eq!(a.position.x, 2.5);
    }

    #[test]
    fn custom_forces_are_consumed() {
        let world = World::default();
        let mut a = agent(0, AgentConfig { mass: 10.0, ..inert(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO) });
        a.apply_force(Vec3::new(0.0, 0.0, 20.0));
        update_agent_physics(&mut a, &world, 1.0);
        assert_relative_eq!(a.velocity.z, 2.0);
        assert!(a.pending_forces().is_empty());

        update_agent_physics(&mut a, &world, 1.0);
        assert_relative_eq!(a.velocity.z, 2.0);
    }

    #[test]
    fn drag_slows_but_never_reverses() {
        let world = World::default();
        let cfg = AgentConfig {
            drag_coefficient: Some(0.3),
            ..inert(Vec3::new(0.0, 50.0, 0.0), Vec3::new(30.0, 0.0, 0.0))
        };
        let mut a = agent(0, cfg.clone());
        update_agent_physics(&mut a, &world, 0.1);
        assert!(a.velocity.x < 30.0 && a.velocity.x > 0.0);

        let mut b = agent(1, AgentConfig { drag_coefficient: Some(1e6), ..cfg });
        update_agent_physics(&mut b, &world, 0.1);
        assert!(b.velocity.x >= 0.0);
        assert!(b.velocity.x < 1e-9);
    }

    #[test]
    fn friction_applies_only_on_the_ground() {
        let world = World::default();
        let mut a = agent(0, inert(Vec3::new(0.0, 50.0, 0.0), Vec3::new(10.0, 0.0, 0.0)));
        a.body.grounded = true;
        update_agent_physics(&mut a, &world, 0.1);
        // μ = 0.7, |g| = 9.81
        assert_relative_eq!(a.velocity.x, 10.0 - 0.7 * 9.81 * 0.1, epsilon = 1e-12);
        assert!(!a.body.grounded, "airborne after the bounds pass");

        update_agent_physics(&mut a, &world, 0.1);
        assert_relative_eq!(a.velocity.x, 10.0 - 0.7 * 9.81 * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn settles_on_the_floor() {
        let world = World::default();
        let mut a = agent(0, AgentConfig { gravity_affected: true, ..inert(Vec3::ZERO, Vec3::ZERO) });
        for _ in 0..10 {
            update_agent_physics(&mut a, &world, 1.0 / 60.0);
        }
        assert!(a.body.grounded);
        assert_eq!(a.position.y, 0.0);
        assert_eq!(a.velocity.y, 0.0);
    }

    #[test]
    fn bounds_reflect_and_scale_by_restitution() {
        let world = World::default();
        let mut a = agent(0, AgentConfig {
            restitution: Some(0.5),
            ..inert(Vec3::new(510.0, 50.0, 0.0), Vec3::new(5.0, 0.0, 0.0))
        });
        assert_eq!(apply_bounds_constraints(&mut a, &world.bounds), 1);
        assert_eq!(a.position.x, 500.0);
        assert_relative_eq!(a.velocity.x, -2.5);
    }

    #[test]
    fn slow_floor_bounces_come_to_rest() {
        let world = World::default();
        let bounce = |vy: f64| {
            let mut a = agent(0, AgentConfig {
                restitution: Some(0.5),
                ..inert(Vec3::new(0.0, -0.1, 0.0), Vec3::new(0.0, vy, 0.0))
            });
            apply_bounds_constraints(&mut a, &world.bounds);
            assert!(a.body.grounded);
            a.velocity.y
        };
        assert_relative_eq!(bounce(-4.0), 2.0);
        assert_relative_eq!(bounce(-1.0), REST_SPEED);
        assert_eq!(bounce(-0.8), 0.0, "0.4 m/s rebound is below the rest speed");
    }

    #[test]
    fn slow_wall_bounces_still_reflect() {
        let world = World::default();
        let mut a = agent(0, AgentConfig {
            restitution: Some(0.5),
            ..inert(Vec3::new(500.5, 50.0, 0.0), Vec3::new(0.6, 0.0, 0.0))
        });
        apply_bounds_constraints(&mut a, &world.bounds);
        assert_relative_eq!(a.velocity.x, -0.3);
        assert!(!a.body.grounded);
    }

    #[test]
    fn inward_velocity_is_not_flipped() {
        let world = World::default();
        let mut a = agent(0, inert(Vec3::new(-501.0, 50.0, 0.0), Vec3::new(3.0, 0.0, 0.0)));
        apply_bounds_constraints(&mut a, &world.bounds);
        assert_eq!(a.position.x, -500.0);
        assert_eq!(a.velocity.x, 3.0);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let world = World::default();
        let mut a = agent(0, inert(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO));
        a.velocity = Vec3::new(f64::NAN, 0.0, 0.0);
        let outcome = update_agent_physics(&mut a, &world, 0.1);
        assert!(outcome.reset);
        assert_eq!(a.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a.velocity, Vec3::ZERO);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let world = World::default();
        let mut a = agent(0, inert(Vec3::new(0.0, 50.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
        let before = (a.position, a.velocity);
        update_agent_physics(&mut a, &world, 0.0);
        update_agent_physics(&mut a, &world, f64::NAN);
        assert_eq!((a.position, a.velocity), before);
    }

    #[test]
    fn integration_is_deterministic() {
        let world = World::default();
        let cfg = AgentConfig {
            position: Vec3::new(0.0, 10.0, 0.0),
            velocity: Vec3::new(12.0, 3.0, -4.0),
            ..AgentConfig::default()
        };
        let dts = [0.016, 0.017, 0.015, 0.033, 0.001, 0.1];
        let run = || {
            let mut a = agent(3, cfg.clone());
            a.body.thrust = Vec3::new(5000.0, 0.0, 1000.0);
            for _ in 0..20 {
                for &dt in &dts {
                    update_agent_physics(&mut a, &world, dt);
                }
            }
            (a.position, a.velocity)
        };
        assert_eq!(run(), run());
    }
}

#[cfg(test)]
mod resolve {
    use approx::assert_relative_eq;
    use race_collision::{CollisionBody, detector::narrow_phase};
    use race_core::{AgentId, Vec3};

    use super::{agent, inert};
    use crate::resolve_collision;

    fn impact(a: &race_agent::Agent, b: &race_agent::Agent) -> race_collision::Impact {
        narrow_phase(
            &CollisionBody::new(a.id, a.position, a.body.radius),
            &CollisionBody::new(b.id, b.position, b.body.radius),
        )
        .expect("bodies overlap")
    }

    #[test]
    fn head_on_equal_masses() {
        let mut a = agent(0, inert(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
        let mut b = agent(1, inert(Vec3::new(3.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)));
        let hit = impact(&a, &b);
        let res = resolve_collision(&mut a, &mut b, &hit);

        assert_relative_eq!(res.closing_speed, 20.0);
        // e = 0.5 → post-impact relative speed is 10.
        assert_relative_eq!(a.velocity.x, -5.0, epsilon = 1e-9);
        assert_relative_eq!(b.velocity.x, 5.0, epsilon = 1e-9);
        // Penetration 1.0 split evenly.
        assert_relative_eq!(a.position.x, -0.5);
        assert_relative_eq!(b.position.x, 3.5);
        assert_eq!((a.id, b.id), (AgentId(0), AgentId(1)));
    }

    #[test]
    fn separating_pair_is_pushed_apart_without_impulse() {
        let mut a = agent(0, inert(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0)));
        let mut b = agent(1, inert(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
        let hit = impact(&a, &b);
        let res = resolve_collision(&mut a, &mut b, &hit);
        assert_eq!(res.impulse, 0.0);
        assert_eq!(a.velocity.x, -1.0);
        assert_eq!(b.velocity.x, 1.0);
        assert_relative_eq!(b.position.x - a.position.x, 4.0);
    }

    #[test]
    fn coincident_centres_are_skipped() {
        let mut a = agent(0, inert(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        let mut b = agent(1, inert(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0)));
        let hit = impact(&a, &b);
        assert_eq!(hit.normal, Vec3::ZERO);
        let res = resolve_collision(&mut a, &mut b, &hit);
        assert_eq!(res, crate::Resolution::default());
        assert_eq!(a.position, Vec3::ZERO);
        assert_eq!(a.velocity.x, 1.0);
    }
}

#[cfg(test)]
mod engine {
    use approx::assert_relative_eq;
    use race_agent::{AgentManager, ManagerConfig};
    use race_core::{AgentId, Vec3, World};

    use super::inert;
    use crate::PhysicsEngine;

    fn pair() -> AgentManager {
        let mut m = AgentManager::new(ManagerConfig { incident_rate: 0.0, ..ManagerConfig::default() });
        m.add_agent(&inert(Vec3::new(0.0, 50.0, 0.0), Vec3::new(10.0, 0.0, 0.0))).unwrap();
        m.add_agent(&inert(Vec3::new(3.0, 50.0, 0.0), Vec3::new(-10.0, 0.0, 0.0))).unwrap();
        m
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(PhysicsEngine::new(0.0, 30.0).is_err());
        assert!(PhysicsEngine::new(20.0, 0.0).is_err());
    }

    #[test]
    fn step_integrates_detects_and_grades() {
        let mut engine = PhysicsEngine::new(20.0, 30.0).unwrap();
        let mut agents = pair();
        let hits = engine.update(&mut agents, &World::default(), 0.01);

        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].a, hits[0].b), (AgentId(0), AgentId(1)));
        assert_relative_eq!(hits[0].closing_speed, 20.0, epsilon = 1e-9);
        assert_relative_eq!(hits[0].severity, 20.0 / 30.0, epsilon = 1e-9);

        let stats = engine.stats();
        assert_eq!(stats.steps, 1);
        assert_eq!(stats.agent_updates, 2);
        assert_eq!(stats.impulses, 1);

        let va = agents.get(AgentId(0)).unwrap().velocity.x;
        let vb = agents.get(AgentId(1)).unwrap().velocity.x;
        assert!(vb - va >= 0.0, "pair separates after resolution");
    }

    #[test]
    fn crashed_agents_are_left_alone() {
        let mut engine = PhysicsEngine::new(20.0, 30.0).unwrap();
        let mut agents = pair();
        agents.handle_collision(AgentId(1), 1.0);
        let parked = agents.get(AgentId(1)).unwrap().position;

        let hits = engine.update(&mut agents, &World::default(), 0.01);
        assert!(hits.is_empty());
        assert_eq!(agents.get(AgentId(1)).unwrap().position, parked);
        assert_eq!(engine.stats().agent_updates, 1);
    }
}

#[cfg(test)]
mod props {
    use proptest::prelude::*;
    use race_collision::Impact;
    use race_core::{Bounds, Vec3};

    use super::{agent, inert};
    use crate::{apply_bounds_constraints, resolve_collision};

    fn coord() -> impl Strategy<Value = f64> {
        -2000.0..2000.0_f64
    }

    fn vel() -> impl Strategy<Value = f64> {
        -100.0..100.0_f64
    }

    proptest! {
        #[test]
        fn bounds_contain_and_never_amplify(
            p in (coord(), coord(), coord()),
            v in (vel(), vel(), vel()),
            e in 0.0..=1.0_f64,
        ) {
            let bounds = Bounds::default();
            let mut a = agent(0, race_agent::AgentConfig {
                restitution: Some(e),
                ..inert(Vec3::new(p.0, p.1, p.2), Vec3::new(v.0, v.1, v.2))
            });
            let before = a.velocity;
            apply_bounds_constraints(&mut a, &bounds);

            prop_assert!(bounds.contains(a.position));
            for axis in race_core::Axis::ALL {
                prop_assert!(a.velocity[axis].abs() <= before[axis].abs() + 1e-12);
            }
        }

        #[test]
        fn impulses_separate_and_conserve_momentum(
            ma in 1.0..5000.0_f64,
            mb in 1.0..5000.0_f64,
            va in (vel(), vel(), vel()),
            vb in (vel(), vel(), vel()),
            dir in (vel(), vel(), vel()),
            e in 0.0..=1.0_f64,
        ) {
            let dir = Vec3::new(dir.0, dir.1, dir.2);
            prop_assume!(dir.length() > 1e-3);
            let n = dir.normalize_or_zero();

            let mut a = agent(0, race_agent::AgentConfig {
                mass: ma,
                restitution: Some(e),
                ..inert(Vec3::ZERO, Vec3::new(va.0, va.1, va.2))
            });
            let mut b = agent(1, race_agent::AgentConfig {
                mass: mb,
                restitution: Some(e),
                ..inert(n * 3.0, Vec3::new(vb.0, vb.1, vb.2))
            });
            let impact = Impact { normal: n, penetration: 1.0, point: n * 1.5, distance: 3.0 };
            let (pa, pb) = (a.velocity * ma, b.velocity * mb);

            resolve_collision(&mut a, &mut b, &impact);

            let v_rel = (b.velocity - a.velocity).dot(n);
            prop_assert!(v_rel >= -1e-9);

            let da = a.velocity * ma - pa;
            let db = b.velocity * mb - pb;
            let total = da + db;
            prop_assert!(total.length() <= 1e-6 * (1.0 + da.length()));
        }
    }
}
