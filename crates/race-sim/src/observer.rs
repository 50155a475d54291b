//! Simulation observer trait for progress reporting and data collection.

use race_core::Tick;

use crate::{SimStats, TickReport};

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] and
/// [`Simulation::run_for`][crate::Simulation::run_for] at tick boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust
/// use race_core::Tick;
/// use race_sim::{SimObserver, TickReport};
///
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} collisions", report.collisions);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before any processing, with the tick about to run.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the stats phase, with the tick just completed.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}

    /// Called once when the run loop exits.
    fn on_stopped(&mut self, _stats: &SimStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
