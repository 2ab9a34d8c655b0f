//! Typed event bus for combat observers.
//!
//! Replaces observer-pattern delegates with one explicit bus. Guarantees:
//! handlers run synchronously, in subscription order, at publish time.
//! Publishing from inside a handler is disallowed by convention - the bus
//! carries a debug assertion for it, not a type-level proof - because a
//! handler that re-enters `take_damage` can recurse without bound.

use serde::{Deserialize, Serialize};

/// Everything the combat core reports to the outside world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BossEvent {
    HealthChanged { current: f32, max: f32 },
    Healed { current: f32, max: f32 },
    /// Fired strictly before the matching `HealthChanged` so listeners can
    /// tell a revival apart from a generic heal.
    Revived { current: f32, max: f32 },
    Death,
    PhaseChanged { old_phase: u8, new_phase: u8 },
    BattleStarted { name: String },
    BattleEnded { name: String },
    Defeated { name: String },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&BossEvent) + Send + Sync>;

/// Synchronous publish/subscribe bus.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriberId, Handler)>,
    next_id: u64,
    publishing: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers are invoked in subscription order.
    pub fn subscribe(&mut self, handler: impl FnMut(&BossEvent) + Send + Sync + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false when the id is unknown (already
    /// removed, or from another bus).
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    /// Deliver `event` to every handler, synchronously, in subscription
    /// order. Re-entrant publish is rejected with a warning.
    pub fn publish(&mut self, event: &BossEvent) {
        if self.publishing {
            tracing::warn!(?event, "re-entrant publish rejected; handlers must not publish");
            debug_assert!(false, "re-entrant EventBus::publish");
            return;
        }
        self.publishing = true;
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
        self.publishing = false;
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_bus() -> (EventBus, Arc<Mutex<Vec<BossEvent>>>) {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe(move |ev| sink.lock().unwrap().push(ev.clone()));
        (bus, log)
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let (mut bus, log) = recording_bus();
        bus.publish(&BossEvent::Death);
        assert_eq!(log.lock().unwrap().as_slice(), &[BossEvent::Death]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3 {
            let sink = Arc::clone(&order);
            bus.subscribe(move |_| sink.lock().unwrap().push(tag));
        }
        bus.publish(&BossEvent::Death);
        assert_eq!(order.lock().unwrap().as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handler() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let a_sink = Arc::clone(&hits);
        let a = bus.subscribe(move |_| a_sink.lock().unwrap().push("a"));
        let b_sink = Arc::clone(&hits);
        bus.subscribe(move |_| b_sink.lock().unwrap().push("b"));

        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a), "second unsubscribe is a no-op");
        bus.publish(&BossEvent::Death);
        assert_eq!(hits.lock().unwrap().as_slice(), &["b"]);
    }

    #[test]
    fn test_subscriber_count() {
        let (bus, _log) = recording_bus();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
