//! Simulation time model.
//!
//! # Design
//!
//! The engine advances in discrete ticks, but unlike a calendar simulation
//! each tick covers a variable amount of simulated time (the measured, and
//! clamped, wall-clock delta).  `SimClock` therefore tracks both:
//!
//!   tick     : monotonically increasing step counter
//!   time_secs: accumulated simulated seconds
//!
//! The tick counter is the canonical ordering key; `time_secs` is what
//! physics and AI decision intervals consume.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus accumulated simulated time.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Number of completed ticks.
    pub current_tick: Tick,
    /// Simulated seconds since the clock was created.
    pub time_secs: f64,
    /// Delta time of the most recent tick.
    pub last_delta_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `dt` seconds.
    ///
    /// Negative or non-finite deltas are treated as zero so simulated time
    /// never runs backwards.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.current_tick = self.current_tick + 1;
        self.time_secs += dt;
        self.last_delta_secs = dt;
    }

    /// Break elapsed time into (minutes, seconds, millis) for human-readable logs.
    pub fn elapsed_msm(&self) -> (u64, u32, u32) {
        let total_ms = (self.time_secs.max(0.0) * 1_000.0) as u64;
        let minutes = total_ms / 60_000;
        let seconds = ((total_ms % 60_000) / 1_000) as u32;
        let millis = (total_ms % 1_000) as u32;
        (minutes, seconds, millis)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, s, ms) = self.elapsed_msm();
        write!(f, "{} ({:02}:{:02}.{:03})", self.current_tick, m, s, ms)
    }
}
