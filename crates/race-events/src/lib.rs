//! `race-events`: priority-ordered publish/subscribe for the simulation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`event`]     | `Event`, `EventPayload`: immutable event values           |
//! | [`bus`]       | `EventBus`: subscriptions, bounded queue, dispatch        |
//! | [`namespace`] | `Namespaced`: prefixes event types for shared buses       |
//! | [`error`]     | `EventError`, `HandlerError`, `HandlerResult`              |
//!
//! # Delivery model
//!
//! ```text
//! emit(type, payload)            → queued (oldest evicted when full)
//! emit_immediate(type, payload)  → dispatched synchronously, queue bypassed
//! process_events()               → drain queue FIFO, dispatch each event
//! dispatch                       → handlers for `type` and `"*"`, highest
//!                                  priority first, faults isolated
//! ```
//!
//! Handlers return a [`HandlerResult`]; an `Err` or a panic is logged,
//! counted, and stored for [`EventBus::take_fault`], and delivery continues
//! with the next handler.
//!
//! # Cargo features
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | Uses `rustc-hash`'s FxHashMap for the per-type handler map. |
//! | `serde`   | Derives `Serialize` on `Event` and `EventPayload`.          |

pub mod bus;
pub mod error;
pub mod event;
pub mod namespace;


pub use bus::{BusStats, EventBus, WILDCARD};
pub use error::{EventError, HandlerError, HandlerResult};
pub use event::{Event, EventPayload};
pub use namespace::Namespaced;
