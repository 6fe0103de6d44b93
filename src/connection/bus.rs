//! Listener registry.
//!
//! Every watcher and every in-flight blocking query registers a
//! [`Listener`]. A listener reports [`ListenerState::Completed`] exactly once,
//! when it has reached its terminal state; the bus then drops it. Removal by
//! id is idempotent, so a caller may also remove a listener that already
//! completed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use super::event::IrcEvent;

/// Whether a listener wants further events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Active,
    /// Terminal. The bus unregisters the listener.
    Completed,
}

/// Receives inbound events.
///
/// Called on the connection's reader task; must not block.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &IrcEvent) -> ListenerState;
}

/// Registration handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn Listener>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        trace!(listener = id.0, "Listener registered");
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        if removed {
            trace!(listener = id.0, "Listener removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver an event to every listener registered when dispatch began.
    ///
    /// The registry lock is not held while listeners run, so a listener may
    /// register or remove listeners (including itself).
    pub fn dispatch(&self, event: &IrcEvent) {
        let snapshot: Vec<(ListenerId, Arc<dyn Listener>)> = self.listeners.lock().clone();

        for (id, listener) in snapshot {
            if listener.on_event(event) == ListenerState::Completed {
                self.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountDown {
        remaining: AtomicUsize,
        seen: AtomicUsize,
    }

    impl CountDown {
        fn new(n: usize) -> Arc<Self> {
            Arc::new(Self {
                remaining: AtomicUsize::new(n),
                seen: AtomicUsize::new(0),
            })
        }
    }

    impl Listener for CountDown {
        fn on_event(&self, _event: &IrcEvent) -> ListenerState {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                ListenerState::Completed
            } else {
                ListenerState::Active
            }
        }
    }

    fn ping() -> IrcEvent {
        IrcEvent::ServerError { text: "x".into() }
    }

    #[test]
    fn completed_listener_is_dropped_once() {
        let bus = EventBus::new();
        let listener = CountDown::new(2);
        let id = bus.register(listener.clone());

        bus.dispatch(&ping());
        assert_eq!(bus.len(), 1);
        bus.dispatch(&ping());
        assert!(bus.is_empty());
        bus.dispatch(&ping());

        assert_eq!(listener.seen.load(Ordering::SeqCst), 2);
        assert!(!bus.remove(id));
    }

    #[test]
    fn remove_is_idempotent() {
        let bus = EventBus::new();
        let id = bus.register(CountDown::new(5));
        let other = bus.register(CountDown::new(5));
        assert!(bus.remove(id));
        assert!(!bus.remove(id));
        assert_eq!(bus.len(), 1);
        assert!(bus.remove(other));
    }

    struct Registrar {
        bus: Arc<EventBus>,
    }

    impl Listener for Registrar {
        fn on_event(&self, _event: &IrcEvent) -> ListenerState {
            self.bus.register(CountDown::new(1));
            ListenerState::Completed
        }
    }

    #[test]
    fn listener_may_register_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        bus.register(Arc::new(Registrar { bus: Arc::clone(&bus) }));
        bus.dispatch(&ping());
        // Registrar removed itself; the listener it added was not part of the snapshot.
        assert_eq!(bus.len(), 1);
        bus.dispatch(&ping());
        assert!(bus.is_empty());
    }
}
