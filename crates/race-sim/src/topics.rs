//! Event types emitted by the engine.

pub const STARTED: &str = "simulation:started";
pub const STOPPED: &str = "simulation:stopped";
pub const COLLISION: &str = "simulation:collision";
pub const LAP_COMPLETE: &str = "simulation:lapComplete";
pub const INCIDENT: &str = "simulation:incident";
/// Wrong-state calls and rejected agents.
pub const WARNING: &str = "simulation:warning";
