//! Typed inbound events.
//!
//! The presence engine never looks at raw lines; the reader task converts
//! each parsed [`Message`] into an [`IrcEvent`] and dispatches it. Commands
//! the engine has no interest in produce no event.

use slirc_wire::{ctcp, Message, Numeric, Prefix};

/// A numeric reply (`:server 303 me :alice bob`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericReply {
    /// Host of the sending server, if the line carried a prefix.
    pub server: Option<String>,
    pub code: u16,
    /// All parameters; `params[0]` is the client's own nick.
    pub params: Vec<String>,
}

impl NumericReply {
    pub fn new(code: u16, params: Vec<String>) -> Self {
        Self {
            server: None,
            code,
            params,
        }
    }

    pub fn numeric(&self) -> Option<Numeric> {
        Numeric::from_code(self.code)
    }

    pub fn is(&self, numeric: Numeric) -> bool {
        self.code == numeric.code()
    }

    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).map(String::as_str)
    }

    /// The first parameter after the client nick; for most user-related
    /// replies this is the nick the reply is about.
    pub fn subject(&self) -> Option<&str> {
        self.arg(1)
    }

    /// The trailing parameter.
    pub fn text(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

/// How a text message was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Privmsg,
    Notice,
    /// CTCP ACTION (`/me`).
    Action,
}

/// An inbound protocol event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrcEvent {
    Numeric(NumericReply),
    Message {
        source: String,
        target: String,
        text: String,
        kind: MessageKind,
    },
    Join {
        source: String,
        channel: String,
    },
    Quit {
        source: String,
        reason: Option<String>,
    },
    NickChange {
        source: String,
        new_nick: String,
    },
    /// `ERROR` from the server; the connection is going away.
    ServerError { text: String },
    /// The client side gave up on the connection (read failure, EOF).
    ClientError { reason: String },
}

impl IrcEvent {
    /// Convert a parsed message. Returns `None` for commands the engine
    /// does not track, or for user events without a nick prefix.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if let Some(code) = msg.code() {
            return Some(Self::Numeric(NumericReply {
                server: msg.prefix.as_ref().map(Prefix::to_string),
                code,
                params: msg.params.clone(),
            }));
        }

        match msg.command.as_str() {
            "ERROR" => Some(Self::ServerError {
                text: msg.arg(0).unwrap_or_default().to_string(),
            }),
            "PRIVMSG" | "NOTICE" => {
                let source = user_source(msg)?;
                let target = msg.arg(0)?.to_string();
                let raw = msg.arg(1).unwrap_or_default();
                let (kind, text) = match ctcp::action_text(raw) {
                    Some(action) if msg.command == "PRIVMSG" => (MessageKind::Action, action),
                    _ if msg.command == "NOTICE" => (MessageKind::Notice, raw),
                    _ => (MessageKind::Privmsg, raw),
                };
                Some(Self::Message {
                    source,
                    target,
                    text: text.to_string(),
                    kind,
                })
            }
            "JOIN" => Some(Self::Join {
                source: user_source(msg)?,
                channel: msg.arg(0)?.to_string(),
            }),
            "QUIT" => Some(Self::Quit {
                source: user_source(msg)?,
                reason: msg.arg(0).map(str::to_string),
            }),
            "NICK" => Some(Self::NickChange {
                source: user_source(msg)?,
                new_nick: msg.arg(0)?.to_string(),
            }),
            _ => None,
        }
    }

    /// Nick that caused a user event.
    pub fn source_nick(&self) -> Option<&str> {
        match self {
            Self::Message { source, .. }
            | Self::Join { source, .. }
            | Self::Quit { source, .. }
            | Self::NickChange { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn user_source(msg: &Message) -> Option<String> {
    match msg.prefix.as_ref()? {
        Prefix::User { nick, .. } => Some(nick.clone()),
        Prefix::Server(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> Option<IrcEvent> {
        IrcEvent::from_message(&line.parse::<Message>().unwrap())
    }

    #[test]
    fn numeric_keeps_server_and_params() {
        let Some(IrcEvent::Numeric(reply)) = event(":irc.example.net 303 me :alice bob") else {
            panic!("expected numeric");
        };
        assert_eq!(reply.server.as_deref(), Some("irc.example.net"));
        assert_eq!(reply.numeric(), Some(Numeric::RPL_ISON));
        assert_eq!(reply.subject(), Some("alice bob"));
        assert_eq!(reply.text(), Some("alice bob"));
    }

    #[test]
    fn action_and_notice_are_distinguished() {
        assert!(matches!(
            event(":bob!b@h PRIVMSG #rust :\x01ACTION waves\x01"),
            Some(IrcEvent::Message { kind: MessageKind::Action, ref text, .. }) if text == "waves"
        ));
        assert!(matches!(
            event(":bob!b@h NOTICE me :hi"),
            Some(IrcEvent::Message { kind: MessageKind::Notice, .. })
        ));
        assert!(matches!(
            event(":bob!b@h PRIVMSG me :hi"),
            Some(IrcEvent::Message { kind: MessageKind::Privmsg, .. })
        ));
    }

    #[test]
    fn user_events() {
        assert_eq!(
            event(":bob!b@h NICK :robert"),
            Some(IrcEvent::NickChange {
                source: "bob".into(),
                new_nick: "robert".into()
            })
        );
        assert_eq!(
            event(":bob!b@h QUIT"),
            Some(IrcEvent::Quit {
                source: "bob".into(),
                reason: None
            })
        );
        assert_eq!(
            event(":bob!b@h JOIN #rust").and_then(|e| e.source_nick().map(str::to_string)),
            Some("bob".to_string())
        );
    }

    #[test]
    fn server_error_and_untracked_commands() {
        assert_eq!(
            event("ERROR :Closing link"),
            Some(IrcEvent::ServerError {
                text: "Closing link".into()
            })
        );
        assert_eq!(event("PING :irc.example.net"), None);
        assert_eq!(event(":irc.example.net PRIVMSG me :server notice"), None);
    }
}
