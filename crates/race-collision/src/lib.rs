//! `race-collision`: spatial collision detection.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`body`]      | `CollisionBody`: per-tick (id, position, radius) snapshot  |
//! | [`grid`]      | `SpatialGrid`: uniform 3-D cell hash (broad phase)         |
//! | [`detector`]  | `CollisionDetector`, `Collision`, `Impact` (narrow phase)   |
//! | [`bounds`]    | `check_bounds`, `BoundsViolation`: per-axis wall tests     |
//! | [`proximity`] | `ProximityIndex`: R-tree nearest-agent sensor queries      |
//! | [`error`]     | `CollisionError`, `CollisionResult<T>`                      |
//!
//! # Pipeline
//!
//! ```text
//! bodies ──▶ SpatialGrid::rebuild      (cell = floor(pos / cell_size))
//!        ──▶ candidate pairs           (own cell + 26 neighbours, id_a < id_b)
//!        ──▶ exact sphere overlap      (distance < r_a + r_b)
//!        ──▶ Vec<Collision>            (sorted by (a, b))
//! ```
//!
//! The grid is rebuilt from scratch every call; there is no incremental
//! update.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | Uses `rustc-hash`'s FxHashMap for the grid cells.        |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public value types. |

pub mod body;
pub mod bounds;
pub mod detector;
pub mod error;
pub mod grid;
pub mod proximity;


pub use body::CollisionBody;
pub use bounds::{BoundSide, BoundsViolation, check_bounds};
pub use detector::{Collision, CollisionDetector, DetectorStats, Impact};
pub use error::{CollisionError, CollisionResult};
pub use grid::{CellKey, SpatialGrid};
pub use proximity::ProximityIndex;
