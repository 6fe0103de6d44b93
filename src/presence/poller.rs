//! ISON polling watcher.
//!
//! Every period the poller snapshots its view of the watch list, packs it
//! into ISON queries and records each batch in a FIFO ledger before sending.
//! Servers answer ISON in order, so each RPL_ISON reply is matched against
//! the oldest ledger entry: echoed nicks are online, the rest of the batch
//! is offline.
//!
//! Besides the ledger, the poller infers presence from activity: any message
//! or join from a watched nick marks it online, a quit or ERR_NOSUCHNICK
//! marks it offline. Once the local user quits or the connection fails the
//! poller stops for good and reports its whole view offline.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use slirc_wire::{command, irc_eq, Numeric, MAX_LINE_LEN};
use tracing::{debug, trace, warn};

use super::batch;
use super::nickset::{NickSet, NickSource};
use super::status::{IrcStatus, PresenceSink};
use super::watcher::PresenceWatcher;
use crate::connection::{Connection, IrcEvent, Listener, ListenerId, ListenerState, NumericReply};
use crate::error::TransportError;
use crate::schedule::{self, TaskHandle};

/// Bytes kept free below the protocol line limit.
pub const SAFETY_MARGIN: usize = 10;

/// Fixed part of an RPL_ISON reply line (`:` + ` 303 ` + ` :` and slack).
/// The server name and our nick are added per tick.
pub const REPLY_OVERHEAD: usize = 8;

/// When the poller runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSchedule {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            interval: Duration::from_secs(60),
        }
    }
}

struct PollerInner {
    conn: Arc<Connection>,
    sink: Arc<dyn PresenceSink>,
    /// View of nicks this poller is responsible for.
    view: Arc<dyn NickSource>,
    ledger: Mutex<VecDeque<Vec<String>>>,
    task: TaskHandle,
}

/// Presence watcher that polls with ISON.
pub struct PollingWatcher {
    inner: Arc<PollerInner>,
    /// The list `add`/`remove` mutate. `None` when the poller only covers
    /// a view owned by another watcher.
    watch: Option<Arc<NickSet>>,
    listener: ListenerId,
}

impl PollingWatcher {
    /// Poll `watch` directly; `add`/`remove` mutate it.
    pub fn new(
        conn: Arc<Connection>,
        sink: Arc<dyn PresenceSink>,
        watch: Arc<NickSet>,
        timing: PollSchedule,
    ) -> Self {
        let view: Arc<dyn NickSource> = watch.clone();
        Self::build(conn, sink, view, Some(watch), timing)
    }

    /// Poll a view owned elsewhere, e.g. the nicks a subscription watcher
    /// could not cover. `add`/`remove` are no-ops.
    pub fn with_view(
        conn: Arc<Connection>,
        sink: Arc<dyn PresenceSink>,
        view: Arc<dyn NickSource>,
        timing: PollSchedule,
    ) -> Self {
        Self::build(conn, sink, view, None, timing)
    }

    fn build(
        conn: Arc<Connection>,
        sink: Arc<dyn PresenceSink>,
        view: Arc<dyn NickSource>,
        watch: Option<Arc<NickSet>>,
        timing: PollSchedule,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<PollerInner>| {
            let weak = weak.clone();
            let task = schedule::spawn_repeating(timing.initial_delay, timing.interval, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.tick();
                }
            });
            PollerInner {
                conn: Arc::clone(&conn),
                sink,
                view,
                ledger: Mutex::new(VecDeque::new()),
                task,
            }
        });

        let listener = conn.register(Arc::new(PollerListener(Arc::clone(&inner))));
        debug!(
            initial_delay = ?timing.initial_delay,
            interval = ?timing.interval,
            "ISON poller started"
        );

        Self {
            inner,
            watch,
            listener,
        }
    }

    /// Queries sent but not yet answered.
    pub fn pending_queries(&self) -> usize {
        self.inner.ledger.lock().len()
    }

    /// False once the poller has stopped (local quit or connection failure).
    pub fn is_running(&self) -> bool {
        !self.inner.task.is_cancelled()
    }

    /// Run one polling round now.
    pub fn poll_now(&self) {
        self.inner.tick();
    }
}

impl PresenceWatcher for PollingWatcher {
    fn add(&self, nick: &str) -> Result<(), TransportError> {
        if let Some(watch) = &self.watch {
            watch.insert(nick);
        }
        Ok(())
    }

    fn remove(&self, nick: &str) -> Result<(), TransportError> {
        if let Some(watch) = &self.watch {
            watch.remove(nick);
        }
        Ok(())
    }
}

impl Drop for PollingWatcher {
    fn drop(&mut self) {
        self.inner.task.cancel();
        self.inner.conn.remove_listener(self.listener);
    }
}

impl PollerInner {
    fn tick(&self) {
        if self.task.is_cancelled() {
            return;
        }
        let Some(server) = self.conn.state().server_identity() else {
            trace!("Server identity unknown, skipping ISON round");
            return;
        };
        let nicks = self.view.snapshot();
        if nicks.is_empty() {
            return;
        }

        let own_nick = self.conn.state().nick();
        let overhead = REPLY_OVERHEAD + server.len() + own_nick.len();
        let budget = MAX_LINE_LEN.saturating_sub(SAFETY_MARGIN + overhead);

        let batches = batch::pack(&nicks, budget, 1);
        trace!(nicks = nicks.len(), batches = batches.len(), budget, "ISON round");

        // Held for the whole round: ledger order must match send order even
        // when rounds overlap.
        let mut ledger = self.ledger.lock();
        for batch in batches {
            let line = command::ison(&batch);
            ledger.push_back(batch);
            match self.conn.send(line) {
                Ok(()) => {}
                Err(TransportError::LineTooLong { len, limit }) => {
                    let skipped = ledger.pop_back().unwrap_or_default();
                    warn!(nicks = ?skipped, len, limit, "ISON query too long, skipping batch");
                }
                Err(e) => {
                    ledger.pop_back();
                    warn!(error = %e, "Failed to send ISON, retrying next round");
                    return;
                }
            }
        }
    }

    fn handle(&self, event: &IrcEvent) -> ListenerState {
        if self.task.is_cancelled() {
            return ListenerState::Completed;
        }

        match event {
            IrcEvent::Numeric(reply) => self.on_numeric(reply),
            IrcEvent::Quit { source, .. } if self.conn.state().is_local(source) => {
                return self.terminate("local quit");
            }
            IrcEvent::ServerError { .. } => return self.terminate("server error"),
            IrcEvent::ClientError { .. } => return self.terminate("client error"),
            IrcEvent::Quit { source, .. } => self.report_if_watched(source, IrcStatus::Offline),
            IrcEvent::NickChange { source, new_nick } => {
                self.report_if_watched(source, IrcStatus::Offline);
                self.report_if_watched(new_nick, IrcStatus::Online);
            }
            IrcEvent::Message { source, .. } | IrcEvent::Join { source, .. } => {
                self.report_if_watched(source, IrcStatus::Online);
            }
        }
        ListenerState::Active
    }

    fn on_numeric(&self, reply: &NumericReply) {
        match reply.numeric() {
            Some(Numeric::RPL_ISON) => self.on_ison(reply),
            Some(Numeric::ERR_NOSUCHNICK) => {
                if let Some(nick) = reply.subject() {
                    self.report_if_watched(nick, IrcStatus::Offline);
                }
            }
            _ => {}
        }
    }

    fn on_ison(&self, reply: &NumericReply) {
        let online: Vec<&str> = reply.arg(1).unwrap_or_default().split_whitespace().collect();

        let Some(mut expected) = self.ledger.lock().pop_front() else {
            warn!(online = online.len(), "ISON reply without a pending query, reporting online nicks only");
            for nick in online {
                self.report_if_watched(nick, IrcStatus::Online);
            }
            return;
        };

        for nick in online {
            match expected.iter().position(|queried| irc_eq(queried, nick)) {
                Some(idx) => {
                    let queried = expected.remove(idx);
                    self.sink.nick_presence(&queried, IrcStatus::Online);
                }
                None => self.report_if_watched(nick, IrcStatus::Online),
            }
        }

        for nick in expected {
            self.sink.nick_presence(&nick, IrcStatus::Offline);
        }
    }

    fn report_if_watched(&self, nick: &str, status: IrcStatus) {
        if let Some(canonical) = self.view.canonical(nick) {
            self.sink.nick_presence(&canonical, status);
        }
    }

    fn terminate(&self, reason: &'static str) -> ListenerState {
        self.task.cancel();
        self.ledger.lock().clear();
        let nicks = self.view.snapshot();
        debug!(reason, nicks = nicks.len(), "ISON poller stopped");
        for nick in nicks {
            self.sink.nick_presence(&nick, IrcStatus::Offline);
        }
        ListenerState::Completed
    }
}

struct PollerListener(Arc<PollerInner>);

impl Listener for PollerListener {
    fn on_event(&self, event: &IrcEvent) -> ListenerState {
        self.0.handle(event)
    }
}
