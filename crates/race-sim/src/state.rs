use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimState {
    #[default]
    Idle,
    Initialized,
    Running,
    Stopped,
    /// Terminal: every further call is rejected.
    Destroyed,
}

impl SimState {
    pub fn as_str(self) -> &'static str {
        match self {
            SimState::Idle => "idle",
            SimState::Initialized => "initialized",
            SimState::Running => "running",
            SimState::Stopped => "stopped",
            SimState::Destroyed => "destroyed",
        }
    }

    /// States in which a tick may be executed.
    #[inline]
    pub fn can_step(self) -> bool {
        matches!(self, SimState::Initialized | SimState::Running)
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
