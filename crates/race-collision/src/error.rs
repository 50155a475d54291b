use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
}

pub type CollisionResult<T> = Result<T, CollisionError>;
