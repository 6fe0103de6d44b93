//! Presence status values and the sink they are reported to.

use std::fmt;

use tracing::info;

/// Status at or above this level counts as available (not away).
pub const AVAILABLE_THRESHOLD: u8 = 50;

/// Status at or above this level (and below [`AVAILABLE_THRESHOLD`]) counts
/// as away. Anything lower cannot be published.
pub const AWAY_THRESHOLD: u8 = 20;

/// IRC presence of a user, ordered by increasing connectivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IrcStatus {
    Offline,
    Away,
    Online,
}

impl IrcStatus {
    /// Numeric status level as understood by presence front ends.
    pub const fn level(self) -> u8 {
        match self {
            Self::Offline => 0,
            Self::Away => 40,
            Self::Online => 65,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Away => "Away",
            Self::Online => "Online",
        }
    }
}

impl fmt::Display for IrcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives presence updates.
///
/// Called from the connection's reader task and from the poller's timer;
/// implementations must be cheap and must not block.
pub trait PresenceSink: Send + Sync {
    /// A watched nick changed status.
    fn nick_presence(&self, nick: &str, status: IrcStatus);

    /// The local user's status changed after server confirmation.
    fn local_presence(&self, previous: IrcStatus, current: IrcStatus);
}

/// Sink that logs every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl PresenceSink for LogSink {
    fn nick_presence(&self, nick: &str, status: IrcStatus) {
        info!(nick = %nick, status = %status, "Presence update");
    }

    fn local_presence(&self, previous: IrcStatus, current: IrcStatus) {
        info!(from = %previous, to = %current, "Local presence changed");
    }
}
