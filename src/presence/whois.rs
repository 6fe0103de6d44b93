//! One-shot WHOIS reply collector.
//!
//! Registered for the duration of a single [`super::PresenceManager::query`]
//! call. Collects RPL_WHOISUSER / RPL_AWAY for the queried nick and resolves
//! on RPL_ENDOFWHOIS. An away reply wins over a plain user reply regardless
//! of arrival order.

use std::sync::Arc;

use parking_lot::Mutex;
use slirc_wire::{irc_eq, Numeric};

use super::status::IrcStatus;
use crate::connection::{Connection, IrcEvent, Listener, ListenerState, NumericReply};
use crate::error::ReplyError;
use crate::signal::SignalSender;

enum Phase {
    /// Waiting for the end of WHOIS. Starts at `Offline`: a WHOIS that ends
    /// without a user reply means the nick is not on the network.
    Collecting(IrcStatus),
    Completed,
}

pub(crate) struct WhoisListener {
    nick: String,
    conn: Arc<Connection>,
    phase: Mutex<Phase>,
    result: SignalSender<IrcStatus, ReplyError>,
}

impl WhoisListener {
    pub(crate) fn new(
        nick: impl Into<String>,
        conn: Arc<Connection>,
        result: SignalSender<IrcStatus, ReplyError>,
    ) -> Self {
        Self {
            nick: nick.into(),
            conn,
            phase: Mutex::new(Phase::Collecting(IrcStatus::Offline)),
            result,
        }
    }

    fn on_numeric(&self, reply: &NumericReply, phase: &mut Phase) -> ListenerState {
        let Phase::Collecting(status) = phase else {
            return ListenerState::Completed;
        };
        if !reply.subject().is_some_and(|subject| irc_eq(subject, &self.nick)) {
            return ListenerState::Active;
        }

        match reply.numeric() {
            Some(Numeric::RPL_WHOISUSER) => {
                if *status != IrcStatus::Away {
                    *status = IrcStatus::Online;
                }
                ListenerState::Active
            }
            Some(Numeric::RPL_AWAY) => {
                *status = IrcStatus::Away;
                ListenerState::Active
            }
            Some(Numeric::RPL_ENDOFWHOIS) => {
                let resolved = *status;
                *phase = Phase::Completed;
                self.result.complete(resolved);
                ListenerState::Completed
            }
            _ => ListenerState::Active,
        }
    }

    fn fail(&self, error: ReplyError, phase: &mut Phase) -> ListenerState {
        *phase = Phase::Completed;
        self.result.fail(error);
        ListenerState::Completed
    }
}

impl Listener for WhoisListener {
    fn on_event(&self, event: &IrcEvent) -> ListenerState {
        let mut phase = self.phase.lock();
        if matches!(*phase, Phase::Completed) {
            return ListenerState::Completed;
        }

        match event {
            IrcEvent::Numeric(reply) => self.on_numeric(reply, &mut phase),
            IrcEvent::Quit { source, .. } if self.conn.state().is_local(source) => {
                self.fail(ReplyError::LocalQuit, &mut phase)
            }
            IrcEvent::ServerError { text } => self.fail(ReplyError::Server(text.clone()), &mut phase),
            IrcEvent::ClientError { reason } => {
                self.fail(ReplyError::Client(reason.clone()), &mut phase)
            }
            _ => ListenerState::Active,
        }
    }
}
