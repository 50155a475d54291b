//! Namespaced view over a shared [`EventBus`].
//!
//! Components that share one bus take a `Namespaced` view so their event
//! types cannot collide: `bus.namespace("simulation").emit("started", ..)`
//! emits `"simulation:started"`.

use race_core::SubscriptionId;

use crate::{Event, EventBus, EventPayload, HandlerResult};

/// A borrowed view of an [`EventBus`] that prefixes every event type.
pub struct Namespaced<'a> {
    bus:    &'a mut EventBus,
    prefix: String,
}

impl<'a> Namespaced<'a> {
    pub(crate) fn new(bus: &'a mut EventBus, prefix: &str) -> Self {
        Self { bus, prefix: prefix.to_owned() }
    }

    /// The fully qualified event type for `event_type` in this namespace.
    pub fn qualify(&self, event_type: &str) -> String {
        qualify(&self.prefix, event_type)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn on<F>(&mut self, event_type: &str, handler: F, priority: i32) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + Send + 'static,
    {
        let full = self.qualify(event_type);
        self.bus.on(&full, handler, priority)
    }

    pub fn once<F>(&mut self, event_type: &str, handler: F, priority: i32) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + Send + 'static,
    {
        let full = self.qualify(event_type);
        self.bus.once(&full, handler, priority)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    pub fn emit(&mut self, event_type: &str, payload: impl Into<EventPayload>) {
        let full = self.qualify(event_type);
        self.bus.emit(&full, payload);
    }

    pub fn emit_immediate(&mut self, event_type: &str, payload: impl Into<EventPayload>) {
        let full = self.qualify(event_type);
        self.bus.emit_immediate(&full, payload);
    }

    /// Nest a further namespace: `"a"` then `"b"` yields `"a:b:<type>"`.
    pub fn namespace(&mut self, prefix: &str) -> Namespaced<'_> {
        let nested = self.qualify(prefix);
        Namespaced { bus: &mut *self.bus, prefix: nested }
    }
}

/// Join a namespace prefix and a local event type.
pub fn qualify(prefix: &str, event_type: &str) -> String {
    if prefix.is_empty() {
        event_type.to_owned()
    } else {
        format!("{prefix}:{event_type}")
    }
}
