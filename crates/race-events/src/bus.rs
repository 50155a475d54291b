//! The event bus: subscriptions, the bounded queue, and dispatch.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use race_core::SubscriptionId;

use crate::{Event, EventError, EventPayload, HandlerResult, Namespaced};

/// Subscribing to this type receives every event regardless of its type.
pub const WILDCARD: &str = "*";

type Handler = Box<dyn FnMut(&Event) -> HandlerResult + Send>;

#[cfg(feature = "fx-hash")]
type HandlerMap = rustc_hash::FxHashMap<String, Vec<Subscription>>;
#[cfg(not(feature = "fx-hash"))]
type HandlerMap = std::collections::HashMap<String, Vec<Subscription>>;

struct Subscription {
    id:        SubscriptionId,
    priority:  i32,
    once:      bool,
    delivered: bool,
    handler:   Handler,
}

/// Counters describing everything the bus has done since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BusStats {
    /// Events created by `emit` or `emit_immediate`.
    pub emitted:        u64,
    /// Events dispatched (whether or not any handler was subscribed).
    pub processed:      u64,
    /// Queued events evicted because the queue was full.
    pub dropped:        u64,
    /// Handler invocations that returned `Err` or panicked.
    pub handler_faults: u64,
}

/// Priority-ordered publish/subscribe bus.
///
/// Handlers for one type are kept sorted by descending priority; equal
/// priorities keep registration order.  Wildcard handlers are interleaved
/// with typed handlers by the same rule.
pub struct EventBus {
    handlers: HandlerMap,
    wildcard: Vec<Subscription>,
    queue:    VecDeque<Event>,
    capacity: usize,
    next_sub: u64,
    next_seq: u64,
    now:      f64,
    stats:    BusStats,
    fault:    Option<EventError>,
}

impl EventBus {
    /// Create a bus whose queue holds at most `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            handlers: HandlerMap::default(),
            wildcard: Vec::new(),
            queue:    VecDeque::with_capacity(capacity.clamp(1, 4_096)),
            capacity: capacity.max(1),
            next_sub: 0,
            next_seq: 0,
            now:      0.0,
            stats:    BusStats::default(),
            fault:    None,
        }
    }

    // ── Subscriptions ─────────────────────────────────────────────────────

    /// Register `handler` for `event_type` at `priority` (higher runs first).
    pub fn on<F>(&mut self, event_type: &str, handler: F, priority: i32) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + Send + 'static,
    {
        self.subscribe(event_type, Box::new(handler), priority, false)
    }

    /// Like [`on`](Self::on) but the handler is removed after its first delivery.
    pub fn once<F>(&mut self, event_type: &str, handler: F, priority: i32) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + Send + 'static,
    {
        self.subscribe(event_type, Box::new(handler), priority, true)
    }

    /// Remove a subscription.  Returns `false` if `id` was not registered.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.wildcard.len();
        self.wildcard.retain(|s| s.id != id);
        if self.wildcard.len() != before {
            return true;
        }
        for subs in self.handlers.values_mut() {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            if subs.len() != before {
                return true;
            }
        }
        false
    }

    /// Number of handlers registered for exactly `event_type`.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        if event_type == WILDCARD {
            return self.wildcard.len();
        }
        self.handlers.get(event_type).map_or(0, Vec::len)
    }

    fn subscribe(&mut self, event_type: &str, handler: Handler, priority: i32, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_sub);
        self.next_sub += 1;
        let sub = Subscription { id, priority, once, delivered: false, handler };
        let list = if event_type == WILDCARD {
            &mut self.wildcard
        } else {
            self.handlers.entry(event_type.to_owned()).or_default()
        };
        // Insert after every handler with priority >= ours (stable for ties).
        let pos = list.partition_point(|s| s.priority >= priority);
        list.insert(pos, sub);
        id
    }

    // ── Emission ──────────────────────────────────────────────────────────

    /// Set the simulated time stamped on subsequently emitted events.
    ///
    /// Time never moves backwards: earlier values are ignored.
    pub fn set_time(&mut self, now: f64) {
        if now.is_finite() && now > self.now {
            self.now = now;
        }
    }

    /// Queue an event for the next [`process_events`](Self::process_events).
    ///
    /// If the queue is full the oldest queued event is dropped and counted.
    pub fn emit(&mut self, event_type: &str, payload: impl Into<EventPayload>) {
        let event = self.make_event(event_type, payload.into());
        if self.queue.len() >= self.capacity {
            if let Some(evicted) = self.queue.pop_front() {
                self.stats.dropped += 1;
                debug!(
                    event_type = %evicted.event_type,
                    seq = evicted.seq,
                    "event queue full, dropped oldest event"
                );
            }
        }
        self.queue.push_back(event);
    }

    /// Deliver an event synchronously, bypassing the queue.
    pub fn emit_immediate(&mut self, event_type: &str, payload: impl Into<EventPayload>) {
        let event = self.make_event(event_type, payload.into());
        self.dispatch(&event);
    }

    /// Drain the whole queue in FIFO order, dispatching every event.
    ///
    /// Returns the number of events processed.
    pub fn process_events(&mut self) -> usize {
        let batch = std::mem::take(&mut self.queue);
        let count = batch.len();
        for event in &batch {
            self.dispatch(event);
        }
        count
    }

    /// Scoped view that prefixes every event type with `"{prefix}:"`.
    pub fn namespace(&mut self, prefix: &str) -> Namespaced<'_> {
        Namespaced::new(self, prefix)
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Events currently waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take the first handler fault recorded since the last call.
    pub fn take_fault(&mut self) -> Option<EventError> {
        self.fault.take()
    }

    /// Drop every subscription and queued event.  Counters are kept.
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.wildcard.clear();
        self.queue.clear();
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn make_event(&mut self, event_type: &str, payload: EventPayload) -> Event {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stats.emitted += 1;
        Event { seq, timestamp: self.now, event_type: event_type.to_owned(), payload }
    }

    fn dispatch(&mut self, event: &Event) {
        self.stats.processed += 1;

        // Disjoint field borrows: typed list, wildcard list, and the fault sink.
        let mut empty = Vec::new();
        let typed = self.handlers.get_mut(&event.event_type).unwrap_or(&mut empty);
        let wildcard = &mut self.wildcard;
        let stats = &mut self.stats;
        let fault = &mut self.fault;

        let (mut i, mut j) = (0, 0);
        while i < typed.len() || j < wildcard.len() {
            let take_typed = match (typed.get(i), wildcard.get(j)) {
                (Some(t), Some(w)) => t.priority > w.priority || (t.priority == w.priority && t.id < w.id),
                (Some(_), None) => true,
                _ => false,
            };
            let sub = if take_typed {
                i += 1;
                &mut typed[i - 1]
            } else {
                j += 1;
                &mut wildcard[j - 1]
            };
            invoke(sub, event, stats, fault);
        }

        typed.retain(|s| !(s.once && s.delivered));
        wildcard.retain(|s| !(s.once && s.delivered));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1_000)
    }
}

fn invoke(sub: &mut Subscription, event: &Event, stats: &mut BusStats, fault: &mut Option<EventError>) {
    if sub.once && sub.delivered {
        return;
    }
    sub.delivered = true;

    let outcome = catch_unwind(AssertUnwindSafe(|| (sub.handler)(event)));
    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => EventError::HandlerFailed {
            subscription: sub.id,
            event_type:   event.event_type.clone(),
            message:      e.to_string(),
        },
        Err(panic) => EventError::HandlerPanicked {
            subscription: sub.id,
            event_type:   event.event_type.clone(),
            message:      panic_message(panic.as_ref()),
        },
    };

    stats.handler_faults += 1;
    warn!(error = %error, "event handler fault isolated");
    if fault.is_none() {
        *fault = Some(error);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
