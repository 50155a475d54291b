use thiserror::Error;

use race_agent::AgentError;
use race_core::CoreError;
use race_physics::PhysicsError;

use crate::SimState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("cannot {op} while {state}")]
    InvalidState {
        op:    &'static str,
        state: SimState,
    },

    #[error("scenario has {requested} agents but capacity is {max}")]
    Capacity { requested: usize, max: usize },

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

pub type SimResult<T> = Result<T, SimError>;
