//! `race-sim`: the simulation engine.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──initialize──▶ Initialized ──start──▶ Running ──stop──▶ Stopped
//!                          ▲                                     │
//!                          └──────────── initialize ─────────────┘
//! any state ──destroy──▶ Destroyed (terminal)
//! ```
//!
//! Calls made in the wrong state are no-ops that log a warning and report
//! failure; nothing in this crate panics on misuse.
//!
//! # Tick pipeline
//!
//! Every tick runs these phases in order, and only in this order:
//!
//! 1. **Physics**: integrate, detect and resolve collisions; apply collision
//!    damage; queue `simulation:collision` (and `simulation:incident` for
//!    crashes).
//! 2. **Events**: drain the bus queue and dispatch to subscribers.
//! 3. **AI**: agent decisions and metrics; queue `simulation:lapComplete`
//!    and `simulation:incident`.  These reach subscribers on the next tick.
//! 4. **Leaderboard**: recompute every ranking.
//! 5. **Stats**: moving averages of tick work time and frame delta.
//!
//! # Driving the loop
//!
//! | Method                 | Timing                                           |
//! |------------------------|--------------------------------------------------|
//! | [`Simulation::step`]    | One tick with a caller-supplied `dt`.           |
//! | [`Simulation::run_for`] | `n` ticks at the fixed target period, no sleeping. |
//! | [`Simulation::run`]     | Blocks, measuring wall time and sleeping to hold the tick rate until stopped. |

pub mod builder;
pub mod engine;
pub mod error;
pub mod handle;
pub mod observer;
pub mod scenario;
pub mod state;
pub mod stats;
pub mod topics;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use engine::{Simulation, TickReport};
pub use error::{SimError, SimResult};
pub use handle::StopHandle;
pub use observer::{NoopObserver, SimObserver};
pub use scenario::Scenario;
pub use state::SimState;
pub use stats::{Ema, SimStats};
