//! Listener registry distributing `BotEvent` to named observers.
//!
//! Observers subscribe under an event name (the strings returned by
//! `BotEvent::name()`). Publication is synchronous and in registration
//! order; a panicking observer is isolated so later observers still run.
//! Cloning the bus clones a handle to the same registry.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tjsim_types::event::BotEvent;

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&BotEvent) + Send + Sync>;

struct Entry {
    id: u64,
    event: String,
    observer: Observer,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Document-scoped publish/subscribe channel for bot events.
///
/// The facade and relay never see this registry; the interception layer
/// publishes into it and any number of independent observers (panels,
/// loggers) consume from it.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for an event name.
    ///
    /// Multiple observers per name are allowed and are invoked in
    /// registration order.
    pub fn on<F>(&self, event: &str, observer: F) -> SubscriptionId
    where
        F: Fn(&BotEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().expect("event registry poisoned");
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry {
            id,
            event: event.to_string(),
            observer: Arc::new(observer),
        });
        SubscriptionId(id)
    }

    /// Remove a subscription. Returns `true` if it was still registered.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock().expect("event registry poisoned");
        let before = registry.entries.len();
        registry.entries.retain(|e| e.id != id.0);
        registry.entries.len() != before
    }

    /// Synchronously deliver an event to every observer registered under
    /// its name, in registration order.
    ///
    /// An observer that panics is isolated: the panic is logged and the
    /// remaining observers still run. Publishing with no observers is a
    /// no-op.
    pub fn publish(&self, event: &BotEvent) {
        let name = event.name();
        // Snapshot outside the lock so observers may themselves subscribe
        // or publish without deadlocking.
        let observers: Vec<Observer> = {
            let registry = self.registry.lock().expect("event registry poisoned");
            registry
                .entries
                .iter()
                .filter(|e| e.event == name)
                .map(|e| Arc::clone(&e.observer))
                .collect()
        };

        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(event))).is_err() {
                tracing::warn!(event = name, "event observer panicked");
            }
        }
    }

    /// Number of observers currently registered for an event name.
    pub fn observer_count(&self, event: &str) -> usize {
        let registry = self.registry.lock().expect("event registry poisoned");
        registry.entries.iter().filter(|e| e.event == event).count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock().expect("event registry poisoned");
        f.debug_struct("EventBus")
            .field("observers", &registry.entries.len())
            .finish()
    }
}
