//! Impulse-based response for one overlapping pair.

use race_agent::Agent;
use race_collision::Impact;
use race_core::Vec3;

/// Outcome of [`resolve_collision`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    /// Impulse magnitude applied along the normal (0 when skipped).
    pub impulse: f64,
    /// Approach speed along the normal before resolution (0 when separating).
    pub closing_speed: f64,
}

/// Separate `a` and `b` and exchange an impulse along the contact normal.
///
/// `impact.normal` points from `a` to `b`.  Coincident centres carry no
/// normal and are skipped.  Each body is pushed out by half the
/// penetration even when they are already separating.
pub fn resolve_collision(a: &mut Agent, b: &mut Agent, impact: &Impact) -> Resolution {
    let n = impact.normal;
    if impact.distance <= Vec3::EPSILON || n.length_squared() <= Vec3::EPSILON {
        return Resolution::default();
    }

    let push = n * (0.5 * impact.penetration);
    a.position -= push;
    b.position += push;

    let v_rel = (b.velocity - a.velocity).dot(n);
    if v_rel >= 0.0 {
        return Resolution::default();
    }

    let e = a.body.restitution.min(b.body.restitution).clamp(0.0, 1.0);
    let inv_a = 1.0 / a.body.mass;
    let inv_b = 1.0 / b.body.mass;
    let j = -(1.0 + e) * v_rel / (inv_a + inv_b);

    a.velocity -= n * (j * inv_a);
    b.velocity += n * (j * inv_b);

    Resolution { impulse: j, closing_speed: -v_rel }
}
