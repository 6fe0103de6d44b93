//! Connection boundary.
//!
//! The presence engine talks to the network through two seams: outbound
//! lines go through a [`Transport`], inbound events arrive through
//! [`Connection::dispatch`] and fan out over the [`EventBus`].

mod bus;
mod event;
mod state;

pub use bus::{EventBus, Listener, ListenerId, ListenerState};
pub use event::{IrcEvent, MessageKind, NumericReply};
pub use state::ConnectionState;

use std::sync::Arc;

use slirc_wire::MAX_LINE_LEN;
use tracing::trace;

use crate::error::TransportError;

/// Outbound line sink.
pub trait Transport: Send + Sync {
    /// Queue one line (without CRLF) for sending.
    fn send_raw(&self, line: String) -> Result<(), TransportError>;
}

/// A registered client connection.
pub struct Connection {
    transport: Arc<dyn Transport>,
    bus: EventBus,
    state: ConnectionState,
}

impl Connection {
    pub fn new(transport: Arc<dyn Transport>, state: ConnectionState) -> Self {
        Self {
            transport,
            bus: EventBus::new(),
            state,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Send one line. Lines over the protocol limit are refused.
    pub fn send(&self, line: String) -> Result<(), TransportError> {
        if line.len() > MAX_LINE_LEN {
            return Err(TransportError::LineTooLong {
                len: line.len(),
                limit: MAX_LINE_LEN,
            });
        }
        trace!(line = %line, "-> send");
        self.transport.send_raw(line)
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        self.bus.register(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.bus.remove(id)
    }

    /// Register a listener for the lifetime of the returned guard.
    pub fn register_scoped(&self, listener: Arc<dyn Listener>) -> ListenerGuard<'_> {
        ListenerGuard {
            conn: self,
            id: self.register(listener),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.bus.len()
    }

    /// Deliver an inbound event to all listeners.
    ///
    /// Listeners see the event before a local nick change is applied, so
    /// they can still recognise the old nick as local.
    pub fn dispatch(&self, event: &IrcEvent) {
        self.bus.dispatch(event);

        if let IrcEvent::NickChange { source, new_nick } = event
            && self.state.is_local(source)
        {
            trace!(old = %source, new = %new_nick, "Local nick changed");
            self.state.set_nick(new_nick.as_str());
        }
    }
}

/// Removes its listener when dropped, including when the future holding it
/// is cancelled mid-await.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard<'a> {
    conn: &'a Connection,
    id: ListenerId,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.conn.remove_listener(self.id);
    }
}
