//! Initial conditions for one race.

use race_agent::AgentConfig;
use race_core::{Bounds, Vec3, World};

use crate::{SimError, SimResult};

/// World bounds plus the starting roster.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scenario {
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub agents:     Vec<AgentConfig>,
    /// Track length per lap; `None` disables lap timing.
    pub lap_length: Option<f64>,
    /// Overrides the default gravity when set.
    pub gravity:    Option<Vec3>,
}

impl Default for Scenario {
    fn default() -> Self {
        let bounds = Bounds::default();
        Self {
            bounds_min: bounds.min,
            bounds_max: bounds.max,
            agents:     Vec::new(),
            lap_length: None,
            gravity:    None,
        }
    }
}

impl Scenario {
    pub fn new(bounds_min: Vec3, bounds_max: Vec3) -> Self {
        Self { bounds_min, bounds_max, ..Self::default() }
    }

    pub fn with_agents(mut self, agents: Vec<AgentConfig>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_lap_length(mut self, lap_length: f64) -> Self {
        self.lap_length = Some(lap_length);
        self
    }

    /// Build the world this scenario describes on top of `base`'s constants.
    pub fn world(&self, base: &World) -> SimResult<World> {
        let bounds = Bounds::new(self.bounds_min, self.bounds_max)?;
        if let Some(len) = self.lap_length {
            if !(len.is_finite() && len > 0.0) {
                return Err(SimError::Scenario(format!("lap_length must be positive, got {len}")));
            }
        }
        let world = World {
            bounds,
            gravity: self.gravity.unwrap_or(base.gravity),
            constants: base.constants,
            lap_length: self.lap_length,
        };
        world.validate()?;
        Ok(world)
    }

    /// Check capacity, every agent config and that each start position is in
    /// bounds.  Returns the resulting world.
    pub fn validate(&self, max_agents: usize, base: &World) -> SimResult<World> {
        if self.agents.len() > max_agents {
            return Err(SimError::Capacity { requested: self.agents.len(), max: max_agents });
        }
        let world = self.world(base)?;
        for cfg in &self.agents {
            cfg.validate()?;
            if !world.bounds.contains(cfg.position) {
                return Err(SimError::Scenario(format!(
                    "{} starts outside the world at {}",
                    cfg.name, cfg.position
                )));
            }
        }
        Ok(world)
    }
}
