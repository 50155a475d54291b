//! `race-leaderboard`: rankings recomputed wholesale every tick.
//!
//! A [`Leaderboard`] holds named [`Criterion`]s, each a value extractor plus
//! a [`SortOrder`].  [`Leaderboard::update`] filters to active, alive agents,
//! sorts by each criterion with ties broken by ascending `AgentId`, and
//! assigns ranks `1..=n`.  Rankings are never patched incrementally, so
//! every criterion is a strict total order over the same agent set.

pub mod board;
pub mod criterion;
pub mod error;


pub use board::{Leaderboard, RankedEntry, Snapshot};
pub use criterion::{Criterion, SortOrder, default_criteria, names};
pub use error::{LeaderboardError, LeaderboardResult};
