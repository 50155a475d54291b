use thiserror::Error;

use race_collision::CollisionError;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error(transparent)]
    Collision(#[from] CollisionError),

    #[error("crash speed must be positive and finite, got {0}")]
    InvalidCrashSpeed(f64),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
