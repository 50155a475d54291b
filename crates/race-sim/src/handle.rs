//! Cross-thread stop signal for [`Simulation::run`](crate::Simulation::run).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clonable flag checked once per iteration of the run loop.
///
/// A tick already in progress completes before the stop takes effect.  A
/// request made before `run` is entered stops it before the first tick; the
/// flag clears once the simulation has stopped.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
