//! Per-update outcomes reported by the agent manager.

use std::fmt;

use race_core::AgentId;

/// What caused an incident.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncidentCause {
    Mechanical,
    SpinOut,
    DriverError,
    /// A collision severe enough to crash the agent.
    Collision,
}

impl IncidentCause {
    /// Causes a random incident may draw from.
    pub const RANDOM: [IncidentCause; 3] = [
        IncidentCause::Mechanical,
        IncidentCause::SpinOut,
        IncidentCause::DriverError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentCause::Mechanical => "mechanical",
            IncidentCause::SpinOut => "spin_out",
            IncidentCause::DriverError => "driver_error",
            IncidentCause::Collision => "collision",
        }
    }
}

impl fmt::Display for IncidentCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LapRecord {
    pub agent: AgentId,
    /// 1-based number of the lap just completed.
    pub lap: u32,
    pub lap_time: f64,
    pub best_lap_time: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncidentRecord {
    pub agent: AgentId,
    pub severity: f64,
    pub crashed: bool,
    pub cause: IncidentCause,
}

/// Everything noteworthy that happened during one `AgentManager::update`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateReport {
    /// Number of AI decisions taken.
    pub decisions: usize,
    pub laps: Vec<LapRecord>,
    pub incidents: Vec<IncidentRecord>,
}
