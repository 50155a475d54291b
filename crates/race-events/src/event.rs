//! Immutable event values.

use race_core::{AgentId, Vec3};

/// A single emitted event.
///
/// `seq` is strictly increasing per bus and `timestamp` (simulated seconds)
/// never decreases, so events are totally ordered by emission.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    pub seq:        u64,
    pub timestamp:  f64,
    pub event_type: String,
    pub payload:    EventPayload,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventPayload {
    /// No data beyond the event type.
    Empty,

    /// Two agents overlapped this tick.
    Collision {
        a:           AgentId,
        b:           AgentId,
        normal:      Vec3,
        penetration: f64,
        point:       Vec3,
        /// Closing speed normalised to `[0, 1]`.
        severity:    f64,
    },

    /// An agent crossed its next lap mark.
    LapComplete {
        agent:         AgentId,
        lap:           u32,
        lap_time:      f64,
        best_lap_time: f64,
    },

    /// Something happened to an agent that degraded it (or crashed it).
    Incident {
        agent:    AgentId,
        severity: f64,
        crashed:  bool,
        cause:    String,
    },

    /// A recoverable problem worth surfacing to subscribers.
    Warning { message: String },

    /// Free-form data, e.g. from external collaborators or stats snapshots.
    Custom(serde_json::Value),
}

impl From<serde_json::Value> for EventPayload {
    fn from(value: serde_json::Value) -> Self {
        EventPayload::Custom(value)
    }
}
