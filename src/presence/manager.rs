//! Presence façade for one connection.
//!
//! Picks the presence mechanism once, from the server's capability table:
//!
//! | Server advertises | Primary watcher | ISON poller (if enabled)      |
//! |-------------------|-----------------|-------------------------------|
//! | `MONITOR`         | MONITOR         | watch list - MONITOR list     |
//! | `WATCH`           | WATCH           | watch list - WATCH list       |
//! | neither           | ISON poller     | (is the primary)              |
//! | neither, polling disabled | none    | -                             |
//!
//! Also tracks the local user's away state. An away request is only a
//! request: the local state changes when the server confirms it with
//! RPL_NOWAWAY / RPL_UNAWAY.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slirc_wire::{command, validate_nick, Numeric};
use tracing::{debug, Instrument};

use super::nickset::{Difference, NickSet};
use super::poller::PollingWatcher;
use super::status::{IrcStatus, PresenceSink, AVAILABLE_THRESHOLD, AWAY_THRESHOLD};
use super::subscription::SubscriptionWatcher;
use super::watcher::PresenceWatcher;
use super::whois::WhoisListener;
use crate::capabilities::Mechanism;
use crate::config::PresenceConfig;
use crate::connection::{Connection, IrcEvent, Listener, ListenerId, ListenerState};
use crate::error::PresenceError;
use crate::signal::signal;
use crate::telemetry::spans;

/// Away message used when the user goes away without giving one.
pub const DEFAULT_AWAY_MESSAGE: &str = "Away";

/// How watched nicks are tracked on this connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchStrategy {
    /// Server-side MONITOR or WATCH list.
    Subscription(Mechanism),
    /// ISON polling only.
    Polling,
    /// Nothing; adding nicks has no effect.
    Disabled,
}

struct AwayState {
    away: bool,
    /// Message the server confirmed with RPL_NOWAWAY.
    current: String,
    /// Message sent with the last AWAY request.
    submitted: String,
}

struct LocalUser {
    conn: Arc<Connection>,
    sink: Arc<dyn PresenceSink>,
    away: Mutex<AwayState>,
}

impl LocalUser {
    fn handle(&self, event: &IrcEvent) {
        let IrcEvent::Numeric(reply) = event else {
            return;
        };
        if let Some(server) = &reply.server
            && self.conn.state().set_server_identity_once(server)
        {
            debug!(server = %server, "Server identity learned");
        }

        match reply.numeric() {
            Some(Numeric::RPL_NOWAWAY) => {
                {
                    let mut away = self.away.lock();
                    away.current = away.submitted.clone();
                    away.away = true;
                }
                self.sink.local_presence(IrcStatus::Online, IrcStatus::Away);
            }
            Some(Numeric::RPL_UNAWAY) => {
                {
                    let mut away = self.away.lock();
                    away.current.clear();
                    away.away = false;
                }
                self.sink.local_presence(IrcStatus::Away, IrcStatus::Online);
            }
            _ => {}
        }
    }
}

struct LocalUserListener(Arc<LocalUser>);

impl Listener for LocalUserListener {
    fn on_event(&self, event: &IrcEvent) -> ListenerState {
        self.0.handle(event);
        ListenerState::Active
    }
}

/// Presence tracking and away state for one connection.
pub struct PresenceManager {
    conn: Arc<Connection>,
    local: Arc<LocalUser>,
    listener: ListenerId,
    watch_list: Arc<NickSet>,
    strategy: WatchStrategy,
    primary: Option<Box<dyn PresenceWatcher>>,
    fallback: Option<PollingWatcher>,
    reply_timeout: Option<Duration>,
}

impl PresenceManager {
    /// Choose watchers for `conn` and start tracking `watch_list`.
    pub fn new(
        conn: Arc<Connection>,
        sink: Arc<dyn PresenceSink>,
        config: &PresenceConfig,
        watch_list: Arc<NickSet>,
    ) -> Self {
        let local = Arc::new(LocalUser {
            conn: Arc::clone(&conn),
            sink: Arc::clone(&sink),
            away: Mutex::new(AwayState {
                away: false,
                current: String::new(),
                submitted: DEFAULT_AWAY_MESSAGE.to_string(),
            }),
        });
        let listener = conn.register(Arc::new(LocalUserListener(Arc::clone(&local))));

        let schedule = config.poll_schedule();
        let subscription = conn.state().capabilities().subscription();

        let (strategy, primary, fallback) = match subscription {
            Some((mechanism, capacity)) => {
                let watcher = SubscriptionWatcher::new(
                    Arc::clone(&conn),
                    Arc::clone(&sink),
                    mechanism,
                    capacity,
                    Arc::clone(&watch_list),
                );
                let fallback = config.polling_enabled.then(|| {
                    let uncovered = Difference::new(watch_list.clone(), watcher.subscribed());
                    PollingWatcher::with_view(
                        Arc::clone(&conn),
                        Arc::clone(&sink),
                        Arc::new(uncovered),
                        schedule,
                    )
                });
                (
                    WatchStrategy::Subscription(mechanism),
                    Some(Box::new(watcher) as Box<dyn PresenceWatcher>),
                    fallback,
                )
            }
            None if config.polling_enabled => {
                let poller = PollingWatcher::new(
                    Arc::clone(&conn),
                    Arc::clone(&sink),
                    Arc::clone(&watch_list),
                    schedule,
                );
                (
                    WatchStrategy::Polling,
                    Some(Box::new(poller) as Box<dyn PresenceWatcher>),
                    None,
                )
            }
            None => (WatchStrategy::Disabled, None, None),
        };

        debug!(
            strategy = ?strategy,
            fallback_polling = fallback.is_some(),
            watched = watch_list.len(),
            "Presence manager ready"
        );

        Self {
            conn,
            local,
            listener,
            watch_list,
            strategy,
            primary,
            fallback,
            reply_timeout: config.reply_timeout(),
        }
    }

    pub fn strategy(&self) -> WatchStrategy {
        self.strategy
    }

    /// Whether an ISON poller covers the nicks the primary watcher can't.
    pub fn has_fallback_poller(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn watch_list(&self) -> &Arc<NickSet> {
        &self.watch_list
    }

    // ========================================================================
    // Watch list
    // ========================================================================

    /// Start tracking `nick`. A no-op when no watcher is active.
    pub fn add_nick_watch(&self, nick: &str) -> Result<(), PresenceError> {
        let nick = validate_nick(nick, self.conn.state().capabilities().nick_len())?;
        match &self.primary {
            Some(watcher) => Ok(watcher.add(nick)?),
            None => {
                debug!(nick = %nick, "No presence watcher, ignoring watch request");
                Ok(())
            }
        }
    }

    /// Stop tracking `nick`. A no-op when no watcher is active.
    pub fn remove_nick_watch(&self, nick: &str) -> Result<(), PresenceError> {
        match &self.primary {
            Some(watcher) => Ok(watcher.remove(nick)?),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Local away state
    // ========================================================================

    /// Request an away state change.
    ///
    /// A supplied message is validated and becomes the pending message.
    /// AWAY is sent when going away, or when already away and a new message
    /// is given; a bare AWAY is sent when coming back. Nothing changes
    /// locally until the server confirms.
    pub fn away(&self, is_away: bool, message: Option<&str>) -> Result<(), PresenceError> {
        if let Some(message) = message {
            self.validate_away_message(message)?;
        }

        let line = {
            let mut state = self.local.away.lock();
            if let Some(message) = message {
                state.submitted = message.to_string();
            }
            if is_away && (!state.away || message.is_some()) {
                Some(command::away(Some(&state.submitted)))
            } else if !is_away && state.away {
                Some(command::away(None))
            } else {
                None
            }
        };

        if let Some(line) = line {
            self.conn.send(line)?;
        }
        Ok(())
    }

    fn validate_away_message(&self, message: &str) -> Result<(), PresenceError> {
        if message.is_empty() {
            return Err(PresenceError::EmptyAwayMessage);
        }
        if let Some(max) = self.conn.state().capabilities().away_len() {
            let len = message.chars().count();
            if len > max {
                return Err(PresenceError::AwayMessageTooLong { len, max });
            }
        }
        Ok(())
    }

    /// Map a status level onto away/available and request it.
    ///
    /// An empty message counts as no message. Levels below the away
    /// threshold can't be expressed on IRC and are ignored.
    pub fn publish_status(
        &self,
        status: IrcStatus,
        message: Option<&str>,
    ) -> Result<(), PresenceError> {
        let message = message.filter(|m| !m.is_empty());
        let level = status.level();
        if level >= AVAILABLE_THRESHOLD {
            self.away(false, message)
        } else if level >= AWAY_THRESHOLD {
            self.away(true, message)
        } else {
            debug!(status = %status, "Status below away threshold, not published");
            Ok(())
        }
    }

    /// Whether the server has confirmed us as away.
    pub fn is_away(&self) -> bool {
        self.local.away.lock().away
    }

    /// The confirmed away message; empty when not away.
    pub fn message(&self) -> String {
        self.local.away.lock().current.clone()
    }

    /// The local user's status.
    pub fn status(&self) -> IrcStatus {
        if self.is_away() {
            IrcStatus::Away
        } else {
            IrcStatus::Online
        }
    }

    /// The away message when away, otherwise empty.
    pub fn current_status_message(&self) -> String {
        let state = self.local.away.lock();
        if state.away {
            state.current.clone()
        } else {
            String::new()
        }
    }

    // ========================================================================
    // WHOIS
    // ========================================================================

    /// Ask the server for `nick`'s status and wait for the answer.
    ///
    /// Fails if the local user quits or the connection fails before the
    /// end of WHOIS, or when the configured reply timeout passes.
    pub async fn query(&self, nick: &str) -> Result<IrcStatus, PresenceError> {
        let nick = validate_nick(nick, self.conn.state().capabilities().nick_len())?;

        let (tx, rx) = signal();
        let listener = WhoisListener::new(nick, Arc::clone(&self.conn), tx);
        let _listener = self.conn.register_scoped(Arc::new(listener));

        let timeout = self.reply_timeout;
        let status = async {
            self.conn.send(command::whois(nick))?;
            Ok::<_, PresenceError>(rx.wait(timeout).await??)
        }
        .instrument(spans::whois(nick))
        .await?;

        debug!(nick = %nick, status = %status, "WHOIS resolved");
        Ok(status)
    }
}

impl Drop for PresenceManager {
    fn drop(&mut self) {
        self.conn.remove_listener(self.listener);
    }
}
