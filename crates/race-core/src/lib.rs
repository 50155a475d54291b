//! `race-core`: foundational types for the race simulation engine.
//!
//! This crate is a dependency of every other `race-*` crate.  It has no
//! `race-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `SubscriptionId`                               |
//! | [`vec3`]    | `Vec3` value type and vector arithmetic                   |
//! | [`time`]    | `Tick`, `SimClock`                                        |
//! | [`config`]  | `SimConfig` (tick rate, capacity, AI and crash tuning)    |
//! | [`world`]   | `World`, `Bounds`, `PhysicsConstants`                     |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (global)                 |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;
pub mod vec3;
pub mod world;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, SubscriptionId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
pub use vec3::{Axis, Vec3};
pub use world::{Bounds, PhysicsConstants, World};
