//! Top-level engine configuration.

use crate::{CoreError, CoreResult};

/// Engine-wide tuning knobs.
///
/// Typically built in code with struct-update syntax over
/// [`SimConfig::default`], or deserialized (feature `serde`) by the
/// application.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Target ticks per second.  The run loop sleeps to hold this rate.
    pub tick_rate_hz: f64,

    /// Upper bound on simultaneously live agents.
    pub max_agents: usize,

    /// Master RNG seed.  The same seed always produces identical incident draws.
    pub seed: u64,

    /// Measured wall-clock deltas are clamped to this many seconds so a stalled
    /// process does not integrate one enormous step.
    pub max_delta_secs: f64,

    /// Stop automatically after this many ticks.  `None` runs until stopped.
    pub max_ticks: Option<u64>,

    /// Bounded event queue size.  The oldest queued event is evicted on overflow.
    pub event_queue_capacity: usize,

    /// Number of leaderboard snapshots retained in the rolling history.
    pub leaderboard_history: usize,

    /// Smoothing factor for the tick-time moving average, in `(0, 1]`.
    pub stats_smoothing: f64,

    /// Edge length of one broad-phase grid cell, in world units.
    pub grid_cell_size: f64,

    /// Closing speed that maps to collision severity 1.0.
    pub crash_speed: f64,

    /// Severity at or above which an agent crashes (is marked not alive).
    pub crash_threshold: f64,

    /// Random incidents per second for an agent with aggression 1.0.
    pub incident_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz:         60.0,
            max_agents:           100,
            seed:                 42,
            max_delta_secs:       0.1,
            max_ticks:            None,
            event_queue_capacity: 1_000,
            leaderboard_history:  100,
            stats_smoothing:      0.1,
            grid_cell_size:       20.0,
            crash_speed:          30.0,
            crash_threshold:      0.8,
            incident_rate:        0.0005,
        }
    }
}

impl SimConfig {
    /// Seconds between the starts of two consecutive ticks.
    #[inline]
    pub fn target_period_secs(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }

    /// Reject values that would make the loop or the physics ill-defined.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }
        if self.max_agents == 0 {
            return Err(CoreError::Config("max_agents must be at least 1".into()));
        }
        if !(self.max_delta_secs.is_finite() && self.max_delta_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "max_delta_secs must be positive, got {}",
                self.max_delta_secs
            )));
        }
        if self.event_queue_capacity == 0 {
            return Err(CoreError::Config("event_queue_capacity must be at least 1".into()));
        }
        if !(self.stats_smoothing > 0.0 && self.stats_smoothing <= 1.0) {
            return Err(CoreError::Config(format!(
                "stats_smoothing must be in (0, 1], got {}",
                self.stats_smoothing
            )));
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(CoreError::Config(format!(
                "grid_cell_size must be positive, got {}",
                self.grid_cell_size
            )));
        }
        if !(self.crash_speed.is_finite() && self.crash_speed > 0.0) {
            return Err(CoreError::Config(format!(
                "crash_speed must be positive, got {}",
                self.crash_speed
            )));
        }
        if !(self.incident_rate.is_finite() && self.incident_rate >= 0.0) {
            return Err(CoreError::Config(format!(
                "incident_rate must be non-negative, got {}",
                self.incident_rate
            )));
        }
        Ok(())
    }
}
