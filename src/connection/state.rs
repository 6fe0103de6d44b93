//! Per-connection state shared by every component.

use parking_lot::RwLock;
use slirc_wire::irc_eq;

use crate::capabilities::ServerCapabilities;

/// Local nick, server identity and capability table.
pub struct ConnectionState {
    nick: RwLock<String>,
    server: RwLock<Option<String>>,
    capabilities: ServerCapabilities,
}

impl ConnectionState {
    pub fn new(nick: impl Into<String>, capabilities: ServerCapabilities) -> Self {
        Self {
            nick: RwLock::new(nick.into()),
            server: RwLock::new(None),
            capabilities,
        }
    }

    /// The local user's current nick.
    pub fn nick(&self) -> String {
        self.nick.read().clone()
    }

    pub fn set_nick(&self, nick: impl Into<String>) {
        *self.nick.write() = nick.into();
    }

    /// Whether `nick` is the local user.
    pub fn is_local(&self, nick: &str) -> bool {
        irc_eq(&self.nick.read(), nick)
    }

    /// Host name of the server we are connected to, once known.
    pub fn server_identity(&self) -> Option<String> {
        self.server.read().clone()
    }

    /// Record the server identity unless one is already known.
    pub fn set_server_identity_once(&self, host: &str) -> bool {
        let mut server = self.server.write();
        if server.is_some() || host.is_empty() {
            return false;
        }
        *server = Some(host.to_string());
        true
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_nick_is_case_insensitive() {
        let state = ConnectionState::new("Me[away]", ServerCapabilities::empty());
        assert!(state.is_local("me{AWAY}"));
        state.set_nick("other");
        assert!(!state.is_local("me[away]"));
    }

    #[test]
    fn server_identity_set_once() {
        let state = ConnectionState::new("me", ServerCapabilities::empty());
        assert_eq!(state.server_identity(), None);
        assert!(!state.set_server_identity_once(""));
        assert!(state.set_server_identity_once("irc.example.net"));
        assert!(!state.set_server_identity_once("other.example.net"));
        assert_eq!(state.server_identity().as_deref(), Some("irc.example.net"));
    }
}
