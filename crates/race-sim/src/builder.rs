//! Fluent builder for constructing a [`Simulation`].

use race_core::{SimConfig, World};
use race_leaderboard::Criterion;

use crate::{Scenario, SimError, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                                   |
/// |---------------------|-------------------------------------------|
/// | `.world(w)`         | `World::default()` (physics constants, gravity) |
/// | `.criterion(c)`     | Only the four default ranking criteria    |
/// | `.scenario(s)`      | None: the simulation stays `Idle`         |
///
/// # Example
///
/// ```rust
/// use race_agent::AgentConfig;
/// use race_core::{SimConfig, Vec3};
/// use race_sim::{Scenario, SimBuilder, SimState};
///
/// let scenario = Scenario::new(Vec3::new(-100.0, 0.0, -100.0), Vec3::new(100.0, 50.0, 100.0))
///     .with_agents(vec![AgentConfig::default()]);
/// let sim = SimBuilder::new(SimConfig::default())
///     .scenario(scenario)
///     .build()
///     .unwrap();
/// assert_eq!(sim.state(), SimState::Initialized);
/// ```
pub struct SimBuilder {
    config:   SimConfig,
    world:    Option<World>,
    criteria: Vec<Criterion>,
    scenario: Option<Scenario>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, world: None, criteria: Vec::new(), scenario: None }
    }

    /// Base world: physics constants and default gravity.  Bounds and lap
    /// length are replaced by the scenario on initialization.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Register an extra leaderboard criterion.
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Initialize with this scenario as part of `build`.
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// Validate inputs and return a simulation, initialized if a scenario
    /// was supplied.
    pub fn build(self) -> SimResult<Simulation> {
        let mut sim = Simulation::new(self.config)?;
        if let Some(world) = self.world {
            sim.set_world(world)?;
        }
        for criterion in self.criteria {
            sim.leaderboard_mut()
                .add_criterion(criterion)
                .map_err(|e| SimError::Config(e.to_string()))?;
        }
        if let Some(scenario) = self.scenario {
            sim.initialize(&scenario)?;
        }
        Ok(sim)
    }
}
