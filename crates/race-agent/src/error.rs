use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent capacity of {max} reached")]
    CapacityExceeded { max: usize },

    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("roster parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
