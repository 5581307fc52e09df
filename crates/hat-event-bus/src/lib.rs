//! Synchronous event bus for the mock runtime
//!
//! The EventBus delivers every event to its listeners on the publishing
//! thread, in subscription order, before `fire` returns. There is no
//! deferred delivery and no channel buffering: when a test fires an event
//! it can assert on listener side effects on the very next line. Listener
//! panics are not caught, so a broken listener fails the test loudly.

use hat_core::{Context, Event, EventData, EventType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// A unique identifier for an event listener, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked for each matching event
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscription {
    id: ListenerId,
    event_type: EventType,
    listener: Listener,
}

/// Synchronous publish/subscribe bus
///
/// Supports subscribing to a specific event type or to `*` (all events).
/// Listeners for one event type are invoked in the order they subscribed;
/// `*` listeners run after the type-specific ones, also in subscription
/// order.
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_listener_id: AtomicU64,
}

impl EventBus {
    /// Create a new bus with no listeners
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to events of a specific type
    ///
    /// Returns a handle that can be passed to [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing listener");

        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions
            .lock()
            .expect("event bus lock poisoned")
            .push(Subscription {
                id,
                event_type,
                listener: Arc::new(listener),
            });
        id
    }

    /// Subscribe to events of a typed payload's canonical event type
    pub fn subscribe_typed<T, F>(&self, listener: F) -> ListenerId
    where
        T: EventData + serde::de::DeserializeOwned,
        F: Fn(&Event, T) + Send + Sync + 'static,
    {
        self.subscribe(T::event_type(), move |event| {
            if let Some(data) = event.parse_data::<T>() {
                listener(event, data);
            }
        })
    }

    /// Subscribe to all events
    pub fn subscribe_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(EventType::match_all(), listener)
    }

    /// Remove a listener; returns false if the handle was already removed
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut subs = self.subscriptions.lock().expect("event bus lock poisoned");
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Fire an event to all matching listeners, synchronously
    ///
    /// The listener list is snapshotted before delivery, so a listener may
    /// subscribe or unsubscribe without deadlocking; such changes take
    /// effect from the next `fire`.
    pub fn fire(&self, event: Event) {
        debug!(event_type = %event.event_type, "Firing event");

        let matching: Vec<Listener> = {
            let subs = self.subscriptions.lock().expect("event bus lock poisoned");
            let mut specific: Vec<Listener> = Vec::new();
            let mut wildcard: Vec<Listener> = Vec::new();
            for sub in subs.iter() {
                if sub.event_type == event.event_type {
                    specific.push(sub.listener.clone());
                } else if sub.event_type.is_match_all() {
                    wildcard.push(sub.listener.clone());
                }
            }
            specific.extend(wildcard);
            specific
        };

        for listener in matching {
            listener(&event);
        }
    }

    /// Fire a typed payload
    pub fn fire_typed<T: EventData + serde::Serialize>(&self, data: &T, context: Context) {
        self.fire(Event::typed(data, context));
    }

    /// Number of active subscriptions
    pub fn listener_count(&self) -> usize {
        self.subscriptions
            .lock()
            .expect("event bus lock poisoned")
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for EventBus
pub type SharedEventBus = Arc<EventBus>;
