//! MONITOR and WATCH subscription watchers.
//!
//! Both mechanisms keep a server-side list of nicks and push a notification
//! whenever one of them signs on or off, so no ledger is needed. The server
//! caps the list size; nicks beyond the cap stay out of the subscription set
//! and are left to the fallback poller, which covers
//! `watch list - subscribed` through a [`super::Difference`] view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use slirc_wire::{command, nick_of_mask, Numeric, MAX_LINE_LEN};
use tracing::{debug, warn};

use super::batch;
use super::nickset::{NickSet, NickSource};
use super::status::{IrcStatus, PresenceSink};
use super::watcher::PresenceWatcher;
use crate::capabilities::Mechanism;
use crate::connection::{Connection, IrcEvent, Listener, ListenerId, ListenerState, NumericReply};
use crate::error::TransportError;

impl Mechanism {
    /// Bytes available for targets on one line, and the separator length.
    fn line_budget(self) -> (usize, usize) {
        match self {
            // MONITOR + a,b,c
            Self::Monitor => (MAX_LINE_LEN - "MONITOR + ".len(), 1),
            // WATCH +a +b +c
            Self::Watch => (MAX_LINE_LEN - "WATCH +".len(), 2),
        }
    }

    fn subscribe_line(self, nicks: &[String]) -> String {
        match self {
            Self::Monitor => command::monitor_add(nicks),
            Self::Watch => command::watch_add(nicks),
        }
    }

    fn unsubscribe_line(self, nick: &str) -> String {
        match self {
            Self::Monitor => command::monitor_remove(&[nick]),
            Self::Watch => command::watch_remove(&[nick]),
        }
    }
}

struct SubscriptionInner {
    conn: Arc<Connection>,
    sink: Arc<dyn PresenceSink>,
    mechanism: Mechanism,
    capacity: usize,
    watch: Arc<NickSet>,
    subscribed: Arc<NickSet>,
    stopped: AtomicBool,
}

/// Presence watcher backed by a server-side MONITOR or WATCH list.
pub struct SubscriptionWatcher {
    inner: Arc<SubscriptionInner>,
    listener: ListenerId,
}

impl SubscriptionWatcher {
    /// Start watching and subscribe to as much of `watch` as fits.
    pub fn new(
        conn: Arc<Connection>,
        sink: Arc<dyn PresenceSink>,
        mechanism: Mechanism,
        capacity: usize,
        watch: Arc<NickSet>,
    ) -> Self {
        let inner = Arc::new(SubscriptionInner {
            conn: Arc::clone(&conn),
            sink,
            mechanism,
            capacity,
            watch,
            subscribed: Arc::new(NickSet::new()),
            stopped: AtomicBool::new(false),
        });
        let listener = conn.register(Arc::new(SubscriptionListener(Arc::clone(&inner))));

        let initial: Vec<String> = inner.watch.snapshot().into_iter().take(capacity).collect();
        debug!(
            mechanism = ?mechanism,
            capacity,
            initial = initial.len(),
            "Subscription watcher started"
        );
        if let Err(e) = inner.subscribe(initial) {
            warn!(mechanism = ?mechanism, error = %e, "Initial subscription failed");
        }

        Self { inner, listener }
    }

    pub fn mechanism(&self) -> Mechanism {
        self.inner.mechanism
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Nicks currently covered by the server-side list.
    pub fn subscribed(&self) -> Arc<NickSet> {
        Arc::clone(&self.inner.subscribed)
    }
}

impl PresenceWatcher for SubscriptionWatcher {
    fn add(&self, nick: &str) -> Result<(), TransportError> {
        let inner = &self.inner;
        inner.watch.insert(nick);
        if inner.stopped.load(Ordering::Acquire) || inner.subscribed.contains(nick) {
            return Ok(());
        }
        if inner.subscribed.len() >= inner.capacity {
            debug!(nick = %nick, capacity = inner.capacity, "Subscription list full, leaving nick to polling");
            return Ok(());
        }
        let canonical = inner.watch.canonical(nick).unwrap_or_else(|| nick.to_string());
        inner.subscribe(vec![canonical])
    }

    fn remove(&self, nick: &str) -> Result<(), TransportError> {
        let inner = &self.inner;
        let canonical = inner.watch.canonical(nick);
        inner.watch.remove(nick);
        if inner.stopped.load(Ordering::Acquire) || !inner.subscribed.remove(nick) {
            return Ok(());
        }
        let nick = canonical.as_deref().unwrap_or(nick);
        inner.conn.send(inner.mechanism.unsubscribe_line(nick))
    }
}

impl Drop for SubscriptionWatcher {
    fn drop(&mut self) {
        self.inner.conn.remove_listener(self.listener);
    }
}

impl SubscriptionInner {
    /// Mark as many of `nicks` subscribed as capacity allows and send the
    /// subscribe lines. Nicks whose line could not be sent are taken out of
    /// the set again.
    fn subscribe(&self, nicks: Vec<String>) -> Result<(), TransportError> {
        let nicks: Vec<String> = nicks
            .into_iter()
            .filter(|nick| self.subscribed.insert_bounded(nick.as_str(), self.capacity))
            .collect();
        if nicks.is_empty() {
            return Ok(());
        }

        let (budget, separator_len) = self.mechanism.line_budget();
        let batches = batch::pack(&nicks, budget, separator_len);
        for (idx, batch) in batches.iter().enumerate() {
            if let Err(e) = self.conn.send(self.mechanism.subscribe_line(batch)) {
                for nick in batches[idx..].iter().flatten() {
                    self.subscribed.remove(nick);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn handle(&self, event: &IrcEvent) -> ListenerState {
        if self.stopped.load(Ordering::Acquire) {
            return ListenerState::Completed;
        }
        match event {
            IrcEvent::Numeric(reply) => self.on_numeric(reply),
            IrcEvent::Quit { source, .. } if self.conn.state().is_local(source) => {
                return self.terminate("local quit");
            }
            IrcEvent::ServerError { .. } => return self.terminate("server error"),
            IrcEvent::ClientError { .. } => return self.terminate("client error"),
            _ => {}
        }
        ListenerState::Active
    }

    fn on_numeric(&self, reply: &NumericReply) {
        let Some(numeric) = reply.numeric() else {
            return;
        };
        match (self.mechanism, numeric) {
            (Mechanism::Monitor, Numeric::RPL_MONONLINE) => {
                for nick in monitor_targets(reply) {
                    self.report(nick, IrcStatus::Online);
                }
            }
            (Mechanism::Monitor, Numeric::RPL_MONOFFLINE) => {
                for nick in monitor_targets(reply) {
                    self.report(nick, IrcStatus::Offline);
                }
            }
            (Mechanism::Monitor, Numeric::ERR_MONLISTFULL) => {
                let targets = reply.arg(2).unwrap_or_default();
                for nick in targets.split(',').filter(|t| !t.is_empty()).map(nick_of_mask) {
                    self.unsubscribed(nick, "monitor list full");
                }
            }
            (Mechanism::Watch, Numeric::RPL_LOGON | Numeric::RPL_NOWON) => {
                if let Some(nick) = reply.subject() {
                    self.report(nick, IrcStatus::Online);
                }
            }
            (Mechanism::Watch, Numeric::RPL_LOGOFF | Numeric::RPL_NOWOFF) => {
                if let Some(nick) = reply.subject() {
                    self.report(nick, IrcStatus::Offline);
                }
            }
            (Mechanism::Watch, Numeric::RPL_WATCHOFF) => {
                if let Some(nick) = reply.subject() {
                    self.unsubscribed(nick, "watch removed");
                }
            }
            (Mechanism::Watch, Numeric::ERR_TOOMANYWATCH) => {
                if let Some(nick) = reply.subject() {
                    self.unsubscribed(nick, "watch list full");
                }
            }
            _ => {}
        }
    }

    /// Report a pushed status for a watched nick. A push proves the server
    /// is covering the nick.
    fn report(&self, nick: &str, status: IrcStatus) {
        let Some(canonical) = self.watch.canonical(nick) else {
            return;
        };
        self.subscribed.insert(canonical.as_str());
        self.sink.nick_presence(&canonical, status);
    }

    fn unsubscribed(&self, nick: &str, reason: &'static str) {
        if self.subscribed.remove(nick) {
            debug!(nick = %nick, reason, "Nick left subscription list");
        }
    }

    fn terminate(&self, reason: &'static str) -> ListenerState {
        self.stopped.store(true, Ordering::Release);
        let nicks = self.subscribed.snapshot();
        debug!(mechanism = ?self.mechanism, reason, nicks = nicks.len(), "Subscription watcher stopped");
        for nick in nicks {
            self.sink.nick_presence(&nick, IrcStatus::Offline);
        }
        ListenerState::Completed
    }
}

/// Nicks from a `730`/`731` target list (`nick!user@host,...` or `nick,...`).
fn monitor_targets(reply: &NumericReply) -> impl Iterator<Item = &str> {
    reply
        .arg(1)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(nick_of_mask)
}

struct SubscriptionListener(Arc<SubscriptionInner>);

impl Listener for SubscriptionListener {
    fn on_event(&self, event: &IrcEvent) -> ListenerState {
        self.0.handle(event)
    }
}
