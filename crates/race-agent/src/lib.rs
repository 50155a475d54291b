//! `race-agent`: agents and the agent manager.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`agent`]    | `Agent` and its grouped state (`Body`, `Traits`, `AiState`, `Metrics`) |
//! | [`config`]   | `AgentConfig`, `AgentKind`: construction parameters             |
//! | [`behavior`] | `BehaviorMode`, `Decision`, `decide`: closed AI strategy set    |
//! | [`manager`]  | `AgentManager`: slot storage, AI update, collision/incident handling |
//! | [`report`]   | `UpdateReport`, `LapRecord`, `IncidentRecord`, `IncidentCause`   |
//! | [`loader`]   | `load_agents_csv`, `load_agents_reader`                          |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                   |
//!
//! # Update model
//!
//! `AgentManager::update` runs in three phases:
//!
//! ```text
//! ① Decide  : for each active, alive, AI-enabled agent whose decision
//!              interval has elapsed, compute a `Decision` from a read-only
//!              view (parallel with the `parallel` feature).
//! ② Apply   : write decisions back in ascending `AgentId` order.
//! ③ Metrics : distance, fuel, efficiency, lap timing, random incidents.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs the decide phase on Rayon's thread pool.           |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.      |

pub mod agent;
pub mod behavior;
pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod report;


pub use agent::{Agent, AiState, Body, Metrics, Traits};
pub use behavior::{BehaviorMode, Decision, DecisionContext, WAYPOINT_TOLERANCE, decide};
pub use config::{AgentConfig, AgentKind};
pub use error::{AgentError, AgentResult};
pub use loader::{load_agents_csv, load_agents_reader};
pub use manager::{AgentManager, ManagerConfig};
pub use report::{IncidentCause, IncidentRecord, LapRecord, UpdateReport};
