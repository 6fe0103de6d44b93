use crate::error::TransportError;

/// A presence mechanism that can track additional nicks.
///
/// `add`/`remove` update the shared watch list; push-based watchers also
/// subscribe or unsubscribe on the server.
pub trait PresenceWatcher: Send + Sync {
    fn add(&self, nick: &str) -> Result<(), TransportError>;

    fn remove(&self, nick: &str) -> Result<(), TransportError>;
}
