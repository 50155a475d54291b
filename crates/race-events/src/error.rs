use thiserror::Error;

use race_core::SubscriptionId;

/// Error type returned by event handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of every event handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Faults observed while dispatching events.
///
/// Faults never propagate out of [`EventBus::process_events`]; the first one
/// since the last check is kept for [`EventBus::take_fault`].
///
/// [`EventBus::process_events`]: crate::EventBus::process_events
/// [`EventBus::take_fault`]: crate::EventBus::take_fault
#[derive(Debug, Error)]
pub enum EventError {
    #[error("handler {subscription} for {event_type:?} failed: {message}")]
    HandlerFailed {
        subscription: SubscriptionId,
        event_type:   String,
        message:      String,
    },

    #[error("handler {subscription} for {event_type:?} panicked: {message}")]
    HandlerPanicked {
        subscription: SubscriptionId,
        event_type:   String,
        message:      String,
    },
}
