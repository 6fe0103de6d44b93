//! Server capability table.
//!
//! Built once per connection from the accumulated RPL_ISUPPORT tokens and
//! immutable afterwards. A key the server did not advertise means the
//! feature is unsupported, never zero. Values that fail to parse are logged
//! and treated the same as an absent key.

use std::collections::HashMap;

use slirc_wire::{parse_chanlimit, Isupport};
use tracing::{debug, trace, warn};

/// Push-based presence mechanisms, in order of preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// IRCv3 `MONITOR`.
    Monitor,
    /// Bahamut/Unreal style `WATCH`.
    Watch,
}

impl Mechanism {
    /// The ISUPPORT key that advertises the mechanism.
    pub fn isupport_key(self) -> &'static str {
        match self {
            Self::Monitor => "MONITOR",
            Self::Watch => "WATCH",
        }
    }
}

/// Parsed server limits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerCapabilities {
    away_len: Option<usize>,
    monitor_limit: Option<usize>,
    watch_limit: Option<usize>,
    nick_len: Option<usize>,
    channel_len: Option<usize>,
    topic_len: Option<usize>,
    kick_len: Option<usize>,
    chan_types: Option<String>,
    chan_limit: HashMap<char, Option<usize>>,
}

impl ServerCapabilities {
    /// No capabilities advertised.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_isupport(isupport: &Isupport) -> Self {
        let caps = Self {
            away_len: parse_len(isupport, "AWAYLEN"),
            monitor_limit: parse_list_limit(isupport, Mechanism::Monitor),
            watch_limit: parse_list_limit(isupport, Mechanism::Watch),
            nick_len: parse_len(isupport, "NICKLEN"),
            channel_len: parse_len(isupport, "CHANNELLEN"),
            topic_len: parse_len(isupport, "TOPICLEN"),
            kick_len: parse_len(isupport, "KICKLEN"),
            chan_types: isupport.value("CHANTYPES").map(str::to_string),
            chan_limit: isupport.value("CHANLIMIT").map(parse_chanlimit).unwrap_or_default(),
        };
        debug!(
            tokens = isupport.len(),
            monitor = ?caps.monitor_limit,
            watch = ?caps.watch_limit,
            awaylen = ?caps.away_len,
            "Server capabilities parsed"
        );
        caps
    }

    /// Maximum away message length.
    pub fn away_len(&self) -> Option<usize> {
        self.away_len
    }

    /// MONITOR list capacity, if MONITOR is supported.
    pub fn monitor_limit(&self) -> Option<usize> {
        self.monitor_limit
    }

    /// WATCH list capacity, if WATCH is supported.
    pub fn watch_limit(&self) -> Option<usize> {
        self.watch_limit
    }

    pub fn nick_len(&self) -> Option<usize> {
        self.nick_len
    }

    pub fn channel_len(&self) -> Option<usize> {
        self.channel_len
    }

    pub fn topic_len(&self) -> Option<usize> {
        self.topic_len
    }

    pub fn kick_len(&self) -> Option<usize> {
        self.kick_len
    }

    /// Channel name prefixes; `#&` when not advertised.
    pub fn chan_types(&self) -> &str {
        self.chan_types.as_deref().unwrap_or("#&")
    }

    /// Join limit for channels starting with `prefix`.
    ///
    /// `None` if not advertised, `Some(None)` if advertised without a limit.
    pub fn chan_limit(&self, prefix: char) -> Option<Option<usize>> {
        self.chan_limit.get(&prefix).copied()
    }

    /// The preferred push mechanism and its capacity: MONITOR first, then WATCH.
    pub fn subscription(&self) -> Option<(Mechanism, usize)> {
        self.monitor_limit
            .map(|n| (Mechanism::Monitor, n))
            .or_else(|| self.watch_limit.map(|n| (Mechanism::Watch, n)))
    }
}

fn parse_len(isupport: &Isupport, key: &str) -> Option<usize> {
    let Some(value) = isupport.get(key) else {
        trace!(key, "Capability not advertised");
        return None;
    };
    let Some(value) = value else {
        warn!(key, "Capability advertised without a value, ignoring");
        return None;
    };
    match value.parse::<usize>() {
        Ok(n) => {
            debug!(key, value = n, "Capability");
            Some(n)
        }
        Err(e) => {
            warn!(key, value, error = %e, "Unparsable capability value, ignoring");
            None
        }
    }
}

/// MONITOR and WATCH may be advertised bare, meaning no server-side limit.
fn parse_list_limit(isupport: &Isupport, mechanism: Mechanism) -> Option<usize> {
    match isupport.get(mechanism.isupport_key()) {
        Some(None) | Some(Some("")) => {
            debug!(key = mechanism.isupport_key(), "List capability without limit");
            Some(usize::MAX)
        }
        _ => parse_len(isupport, mechanism.isupport_key()),
    }
}
