//! The world an agent population moves in: bounds, gravity, and global
//! physics constants.
//!
//! A `World` is created once when a scenario is loaded and is only changed
//! through explicit configuration calls between ticks.

use crate::{Axis, CoreError, CoreResult, Vec3};

// ── Bounds ───────────────────────────────────────────────────────────────────

/// Axis-aligned box `[min, max]` that contains every agent.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Build bounds after checking `min < max` on every axis.
    pub fn new(min: Vec3, max: Vec3) -> CoreResult<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let ordered = Axis::ALL
            .iter()
            .all(|&a| self.min[a].is_finite() && self.max[a].is_finite() && self.min[a] < self.max[a]);
        if ordered {
            Ok(())
        } else {
            Err(CoreError::InvalidBounds { min: self.min, max: self.max })
        }
    }

    /// `true` if `p` lies inside the box (boundaries included).
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        Axis::ALL.iter().all(|&a| p[a] >= self.min[a] && p[a] <= self.max[a])
    }

    /// Component-wise clamp of `p` into the box.
    #[inline]
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.max(self.min).min(self.max)
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.min.midpoint(self.max)
    }
}

impl Default for Bounds {
    /// A 1 km × 100 m × 1 km box centred on the origin, floor at `y = 0`.
    fn default() -> Self {
        Self {
            min: Vec3::new(-500.0, 0.0, -500.0),
            max: Vec3::new(500.0, 100.0, 500.0),
        }
    }
}

// ── PhysicsConstants ──────────────────────────────────────────────────────────

/// Global constants shared by every agent's force integration.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsConstants {
    /// kg/m³.  Sea-level air is ~1.225.
    pub air_density: f64,
    pub default_drag: f64,
    pub default_friction: f64,
    pub default_restitution: f64,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            air_density:         1.225,
            default_drag:        0.3,
            default_friction:    0.7,
            default_restitution: 0.5,
        }
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Bounds, gravity, and constants for one simulation instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub bounds: Bounds,
    pub gravity: Vec3,
    pub constants: PhysicsConstants,
    /// Track length of one lap.  `None` disables lap timing.
    pub lap_length: Option<f64>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            bounds:     Bounds::default(),
            gravity:    Vec3::new(0.0, -9.81, 0.0),
            constants:  PhysicsConstants::default(),
            lap_length: None,
        }
    }
}

impl World {
    /// A world with the given bounds and default gravity/constants.
    pub fn with_bounds(bounds: Bounds) -> Self {
        Self { bounds, ..Self::default() }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.bounds.validate()?;
        if !self.gravity.is_finite() {
            return Err(CoreError::Config(format!("gravity must be finite, got {}", self.gravity)));
        }
        if !(self.constants.air_density.is_finite() && self.constants.air_density >= 0.0) {
            return Err(CoreError::Config(format!(
                "air_density must be non-negative, got {}",
                self.constants.air_density
            )));
        }
        if let Some(len) = self.lap_length {
            if !(len.is_finite() && len > 0.0) {
                return Err(CoreError::Config(format!("lap_length must be positive, got {len}")));
            }
        }
        Ok(())
    }
}
