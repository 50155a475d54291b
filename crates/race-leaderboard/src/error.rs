use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("criterion `{0}` already exists")]
    DuplicateCriterion(String),

    #[error("unknown criterion `{0}`")]
    UnknownCriterion(String),
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;
