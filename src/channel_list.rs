//! Cached server channel list.
//!
//! `LIST` is expensive for the server and slow to arrive, so the result is
//! kept for a while and shared between callers as an immutable `Arc<[String]>`.
//! The cache lock is held across a fetch: concurrent callers wait for the
//! one in-flight LIST instead of issuing their own.
//!
//! Each published list schedules its own cleanup slightly after expiry. The
//! cleanup only clears the cache if the list it was scheduled for is still
//! the current one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slirc_wire::{command, Numeric};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, trace, Instrument};

use crate::cache::Expiring;
use crate::config::ChannelListConfig;
use crate::connection::{Connection, IrcEvent, Listener, ListenerState, NumericReply};
use crate::error::{ListError, ReplyError};
use crate::schedule;
use crate::signal::{signal, SignalSender};
use crate::telemetry::spans;

type Cache = Arc<AsyncMutex<Expiring<Arc<[String]>>>>;

/// Fetches and caches the channel list of one connection.
pub struct ChannelLister {
    conn: Arc<Connection>,
    cache: Cache,
    expiration: Duration,
    cleanup_grace: Duration,
    reply_timeout: Option<Duration>,
}

impl ChannelLister {
    pub fn new(conn: Arc<Connection>, config: &ChannelListConfig) -> Self {
        Self {
            conn,
            cache: Arc::new(AsyncMutex::new(Expiring::new())),
            expiration: config.expiration(),
            cleanup_grace: config.cleanup_grace(),
            reply_timeout: config.reply_timeout(),
        }
    }

    /// Channel names on the server, from cache when fresh.
    pub async fn list(&self) -> Result<Arc<[String]>, ListError> {
        let mut cache = self.cache.lock().await;
        if let Some(channels) = cache.get(self.expiration) {
            trace!(channels = channels.len(), "Channel list served from cache");
            return Ok(Arc::clone(channels));
        }

        let channels: Arc<[String]> = self.fetch().instrument(spans::list()).await?.into();
        let stamp = cache.set(Arc::clone(&channels));
        drop(cache);
        debug!(channels = channels.len(), "Channel list fetched");

        let cache = Arc::clone(&self.cache);
        schedule::spawn_delayed(self.expiration + self.cleanup_grace, async move {
            if cache.lock().await.clear_if_stamped(stamp) {
                trace!("Expired channel list dropped");
            }
        });

        Ok(channels)
    }

    async fn fetch(&self) -> Result<Vec<String>, ListError> {
        let (tx, rx) = signal();
        let _listener = self
            .conn
            .register_scoped(Arc::new(ListListener::new(Arc::clone(&self.conn), tx)));

        self.conn.send(command::list())?;
        Ok(rx.wait(self.reply_timeout).await??)
    }
}

enum Phase {
    Collecting(Vec<String>),
    Completed,
}

/// Accumulates RPL_LIST entries until RPL_LISTEND.
struct ListListener {
    conn: Arc<Connection>,
    phase: Mutex<Phase>,
    result: SignalSender<Vec<String>, ReplyError>,
}

impl ListListener {
    fn new(conn: Arc<Connection>, result: SignalSender<Vec<String>, ReplyError>) -> Self {
        Self {
            conn,
            phase: Mutex::new(Phase::Collecting(Vec::new())),
            result,
        }
    }

    fn on_numeric(&self, reply: &NumericReply, phase: &mut Phase) -> ListenerState {
        let Phase::Collecting(channels) = phase else {
            return ListenerState::Completed;
        };
        match reply.numeric() {
            Some(Numeric::RPL_LISTSTART) => {
                channels.clear();
                ListenerState::Active
            }
            Some(Numeric::RPL_LIST) => {
                if let Some(channel) = reply.subject() {
                    channels.push(channel.to_string());
                }
                ListenerState::Active
            }
            Some(Numeric::RPL_LISTEND) => {
                let channels = std::mem::take(channels);
                *phase = Phase::Completed;
                self.result.complete(channels);
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

impl Listener for ListListener {
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
