//! Agent construction parameters.

use std::fmt;
use std::str::FromStr;

use race_core::{AgentId, Vec3};

use crate::behavior::BehaviorMode;
use crate::{AgentError, AgentResult};

// ── AgentKind ─────────────────────────────────────────────────────────────────

/// Type tag carried by every agent.  Purely descriptive; physics and AI
/// treat all kinds alike.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AgentKind {
    #[default]
    Vehicle,
    Drone,
    Delivery,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Vehicle => "vehicle",
            AgentKind::Drone => "drone",
            AgentKind::Delivery => "delivery",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> AgentResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vehicle" | "car" => Ok(AgentKind::Vehicle),
            "drone" => Ok(AgentKind::Drone),
            "delivery" => Ok(AgentKind::Delivery),
            other => Err(AgentError::Parse(format!("unknown agent kind `{other}`"))),
        }
    }
}

// ── AgentConfig ───────────────────────────────────────────────────────────────

/// Everything needed to construct one [`Agent`](crate::Agent).
///
/// Start from [`AgentConfig::default`] and override with struct-update
/// syntax:
///
/// ```
/// use race_agent::{AgentConfig, BehaviorMode};
/// use race_core::Vec3;
///
/// let cfg = AgentConfig {
///     name:     "Red".into(),
///     position: Vec3::new(0.0, 0.0, 10.0),
///     behavior: BehaviorMode::Race,
///     ..AgentConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,

    pub position: Vec3,
    pub velocity: Vec3,
    /// Initial heading in radians, measured in the XZ plane from +X toward +Z.
    pub heading: f64,

    pub mass: f64,
    pub radius: f64,
    /// `None` uses `PhysicsConstants::default_drag`.
    pub drag_coefficient: Option<f64>,
    /// `None` uses `PhysicsConstants::default_friction`.
    pub friction_coefficient: Option<f64>,
    /// `None` uses `PhysicsConstants::default_restitution`.
    pub restitution: Option<f64>,
    pub area: f64,
    pub gravity_affected: bool,

    pub max_speed: f64,
    /// Acceleration rating in m/s² produced by full thrust.
    pub acceleration: f64,
    /// Maximum yaw rate in rad/s.
    pub turning_rate: f64,
    pub sensor_range: f64,
    pub aggression: f64,
    /// Fraction of travelled distance that costs no fuel, in `[0, 1]`.
    pub fuel_efficiency: f64,

    pub ai_enabled: bool,
    pub behavior: BehaviorMode,
    pub target: Option<AgentId>,
    pub waypoints: Vec<Vec3>,
    /// Seconds between AI decisions.
    pub decision_interval: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name:                 String::from("agent"),
            kind:                 AgentKind::Vehicle,
            position:             Vec3::ZERO,
            velocity:             Vec3::ZERO,
            heading:              0.0,
            mass:                 1000.0,
            radius:               2.0,
            drag_coefficient:     None,
            friction_coefficient: None,
            restitution:          None,
            area:                 2.0,
            gravity_affected:     true,
            max_speed:            80.0,
            acceleration:         8.0,
            turning_rate:         1.5,
            sensor_range:         50.0,
            aggression:           0.5,
            fuel_efficiency:      0.8,
            ai_enabled:           true,
            behavior:             BehaviorMode::Cruise,
            target:               None,
            waypoints:            Vec::new(),
            decision_interval:    0.1,
        }
    }
}

impl AgentConfig {
    /// Reject configurations that would break the physical invariants.
    pub fn validate(&self) -> AgentResult<()> {
        let positive = [("mass", self.mass), ("radius", self.radius)];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AgentError::InvalidConfig(format!(
                    "{}: {field} must be positive and finite, got {value}",
                    self.name
                )));
            }
        }

        let non_negative = [
            ("area", self.area),
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("turning_rate", self.turning_rate),
            ("sensor_range", self.sensor_range),
            ("decision_interval", self.decision_interval),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AgentError::InvalidConfig(format!(
                    "{}: {field} must be non-negative and finite, got {value}",
                    self.name
                )));
            }
        }

        let unit = [
            ("aggression", Some(self.aggression)),
            ("fuel_efficiency", Some(self.fuel_efficiency)),
            ("restitution", self.restitution),
        ];
        for (field, value) in unit {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(AgentError::InvalidConfig(format!(
                        "{}: {field} must lie in [0, 1], got {v}",
                        self.name
                    )));
                }
            }
        }

        if !(self.position.is_finite() && self.velocity.is_finite() && self.heading.is_finite()) {
            return Err(AgentError::InvalidConfig(format!(
                "{}: initial kinematic state must be finite",
                self.name
            )));
        }
        Ok(())
    }
}
