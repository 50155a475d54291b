//! Unit tests for race-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, SubscriptionId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(SubscriptionId::INVALID.0, u64::MAX);
        assert!(!AgentId::default().is_valid());
        assert!(AgentId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod vec3 {
    use approx::assert_relative_eq;

    use crate::{Axis, Vec3};

    #[test]
    fn arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::splat(3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn normalize_zero_is_none() {
        assert!(Vec3::ZERO.normalize().is_none());
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
        let n = Vec3::new(3.0, 0.0, 4.0).normalize().unwrap();
        assert_relative_eq!(n.length(), 1.0);
        assert_relative_eq!(n.x, 0.6);
    }

    #[test]
    fn distance_and_lerp() {
        let a = Vec3::new(-10.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert_relative_eq!(a.distance(b), 20.0);
        assert_eq!(a.lerp(b, 0.25), Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(a.midpoint(b), Vec3::ZERO);
    }

    #[test]
    fn axis_indexing() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v[Axis::Y], 2.0);
        v[Axis::Z] = -1.0;
        assert_eq!(v.with(Axis::X, 9.0), Vec3::new(9.0, 2.0, -1.0));
    }

    #[test]
    fn clamp_length_only_shrinks() {
        let v = Vec3::new(0.0, 0.0, 10.0);
        assert_relative_eq!(v.clamp_length(5.0).length(), 5.0);
        assert_eq!(v.clamp_length(50.0), v);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn clock_advances_tick_and_time() {
        let mut c = SimClock::new();
        c.advance(0.5);
        c.advance(0.25);
        assert_eq!(c.current_tick, Tick(2));
        assert!((c.time_secs - 0.75).abs() < 1e-12);
        assert_eq!(c.last_delta_secs, 0.25);
    }

    #[test]
    fn negative_and_nan_deltas_do_not_rewind() {
        let mut c = SimClock::new();
        c.advance(1.0);
        c.advance(-5.0);
        c.advance(f64::NAN);
        assert_eq!(c.current_tick, Tick(3));
        assert_eq!(c.time_secs, 1.0);
    }

    #[test]
    fn display_formats_minutes() {
        let mut c = SimClock::new();
        c.advance(61.5);
        assert_eq!(c.to_string(), "T1 (01:01.500)");
    }
}

#[cfg(test)]
mod world {
    use crate::{Bounds, SimConfig, Vec3, World};

    #[test]
    fn bounds_reject_inverted_axis() {
        assert!(Bounds::new(Vec3::splat(0.0), Vec3::new(1.0, -1.0, 1.0)).is_err());
        assert!(Bounds::new(Vec3::splat(0.0), Vec3::splat(1.0)).is_ok());
    }

    #[test]
    fn bounds_clamp_and_contains() {
        let b = Bounds::new(Vec3::splat(-1.0), Vec3::splat(1.0)).unwrap();
        let p = b.clamp(Vec3::new(5.0, 0.0, -7.0));
        assert_eq!(p, Vec3::new(1.0, 0.0, -1.0));
        assert!(b.contains(p));
        assert!(!b.contains(Vec3::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn world_rejects_bad_lap_length() {
        let w = World { lap_length: Some(0.0), ..World::default() };
        assert!(w.validate().is_err());
        assert!(World::default().validate().is_ok());
    }

    #[test]
    fn default_config_is_valid() {
        let c = SimConfig::default();
        c.validate().unwrap();
        assert!((c.target_period_secs() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn zero_tick_rate_rejected() {
        let c = SimConfig { tick_rate_hz: 0.0, ..SimConfig::default() };
        assert!(c.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn same_seed_same_stream() {
        let mut a = AgentRng::new(7, AgentId(3));
        let mut b = AgentRng::new(7, AgentId(3));
        for _ in 0..16 {
            assert_eq!(a.unit().to_bits(), b.unit().to_bits());
        }
    }

    #[test]
    fn different_agents_diverge() {
        let mut a = AgentRng::new(7, AgentId(0));
        let mut b = AgentRng::new(7, AgentId(1));
        let xs: Vec<f64> = (0..8).map(|_| a.unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn gen_bool_handles_nan() {
        let mut a = AgentRng::new(1, AgentId(0));
        assert!(!a.gen_bool(f64::NAN));
        assert!(a.gen_bool(2.0));
    }
}

#[cfg(test)]
mod props {
    use proptest::prelude::*;

    use crate::Vec3;

    proptest! {
        #[test]
        fn normalized_vectors_are_unit_or_absent(x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6) {
            let v = Vec3::new(x, y, z);
            match v.normalize() {
                Some(n) => prop_assert!((n.length() - 1.0).abs() < 1e-9),
                None => prop_assert!(v.length() <= Vec3::EPSILON),
            }
        }
    }
}
