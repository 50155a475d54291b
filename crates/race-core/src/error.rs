//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where they surface core validation failures.

use thiserror::Error;

/// The base error type for `race-core` and a common building block for
/// sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid world bounds: min {min} must be strictly below max {max} on every axis")]
    InvalidBounds { min: crate::Vec3, max: crate::Vec3 },
}

/// Shorthand result type for `race-core`.
pub type CoreResult<T> = Result<T, CoreError>;
