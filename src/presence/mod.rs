//! Presence tracking.
//!
//! - [`PresenceManager`]: per-connection façade; picks watchers, owns the
//!   away state, answers WHOIS queries.
//! - [`SubscriptionWatcher`]: MONITOR / WATCH push notifications.
//! - [`PollingWatcher`]: ISON polling with a FIFO query ledger.
//! - [`NickSet`] / [`Difference`]: the shared watch list and the live view
//!   the fallback poller reads.

pub mod batch;
mod manager;
mod nickset;
mod poller;
mod status;
mod subscription;
mod watcher;
mod whois;

pub use manager::{PresenceManager, WatchStrategy, DEFAULT_AWAY_MESSAGE};
pub use nickset::{Difference, NickSet, NickSource};
pub use poller::{PollSchedule, PollingWatcher, REPLY_OVERHEAD, SAFETY_MARGIN};
pub use status::{IrcStatus, LogSink, PresenceSink, AVAILABLE_THRESHOLD, AWAY_THRESHOLD};
pub use subscription::SubscriptionWatcher;
pub use watcher::PresenceWatcher;
