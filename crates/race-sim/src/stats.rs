//! Rolling performance statistics.

use serde::Serialize;

/// Exponential moving average.  The first sample seeds the average.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    /// `alpha` is clamped into `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha.clamp(f64::MIN_POSITIVE, 1.0) } else { 1.0 };
        Self { alpha, value: None }
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        if !sample.is_finite() {
            return self.get();
        }
        let next = match self.value {
            None => sample,
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    /// Current average, `0.0` before the first sample.
    pub fn get(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Engine-wide counters, as returned by
/// [`Simulation::get_stats`](crate::Simulation::get_stats) and attached to
/// the `simulation:stopped` event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimStats {
    /// Simulated seconds since initialization.
    pub current_time:         f64,
    pub tick_count:           u64,
    pub agents_total:         usize,
    pub agents_active:        usize,
    pub events_emitted:       u64,
    pub events_processed:     u64,
    pub events_dropped:       u64,
    pub handler_faults:       u64,
    /// Single-agent physics integrations.
    pub physics_updates:      u64,
    pub collisions:           u64,
    /// Moving average of the work done per tick, in milliseconds.
    pub average_tick_time_ms: f64,
    /// Ticks per second implied by the moving average of tick deltas.
    pub fps:                  f64,
}
