//! Fake server side of a client connection.

use std::sync::Arc;

use parking_lot::Mutex;
use slirc_presence::connection::{Connection, ConnectionState, IrcEvent, Transport};
use slirc_presence::{ServerCapabilities, TransportError};
use slirc_wire::{Isupport, Message};

/// Records every line the client sends.
#[derive(Default)]
pub struct RecordingTransport {
    lines: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl Transport for RecordingTransport {
    fn send_raw(&self, line: String) -> Result<(), TransportError> {
        if *self.closed.lock() {
            return Err(TransportError::Closed);
        }
        self.lines.lock().push(line);
        Ok(())
    }
}

/// A connection plus the means to play the server's part.
pub struct FakeServer {
    pub conn: Arc<Connection>,
    transport: Arc<RecordingTransport>,
}

#[allow(dead_code)]
impl FakeServer {
    pub const HOST: &'static str = "irc.test.net";

    /// Connection for `nick` on a server advertising `isupport` tokens.
    pub fn new(nick: &str, isupport: &[&str]) -> Self {
        let caps = ServerCapabilities::from_isupport(&Isupport::from_tokens(isupport.iter().copied()));
        let transport = Arc::new(RecordingTransport::default());
        let conn = Arc::new(Connection::new(
            transport.clone(),
            ConnectionState::new(nick, caps),
        ));
        Self { conn, transport }
    }

    /// Parse a raw server line and dispatch it.
    pub fn feed(&self, line: &str) {
        let msg: Message = line.parse().expect("test line parses");
        if let Some(event) = IrcEvent::from_message(&msg) {
            self.conn.dispatch(&event);
        }
    }

    /// Dispatch an event directly.
    pub fn dispatch(&self, event: IrcEvent) {
        self.conn.dispatch(&event);
    }

    /// Make the server known, as the first numeric after registration does.
    pub fn welcome(&self) {
        let nick = self.conn.state().nick();
        self.feed(&format!(":{} 001 {nick} :Welcome", Self::HOST));
    }

    /// Reply to a numeric addressed to our nick.
    pub fn numeric(&self, code: u16, rest: &str) {
        let nick = self.conn.state().nick();
        self.feed(&format!(":{} {code:03} {nick} {rest}", Self::HOST));
    }

    /// All lines sent so far, clearing the record.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut *self.transport.lines.lock())
    }

    pub fn sent(&self) -> Vec<String> {
        self.transport.lines.lock().clone()
    }

    /// Make every further send fail.
    pub fn close(&self) {
        *self.transport.closed.lock() = true;
    }

    /// Wait until a sent line satisfies `pred`.
    pub async fn wait_for_sent(&self, pred: impl Fn(&str) -> bool) -> String {
        for _ in 0..1000 {
            if let Some(line) = self.sent().into_iter().find(|l| pred(l)) {
                return line;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected line was never sent; sent: {:?}", self.sent());
    }
}
