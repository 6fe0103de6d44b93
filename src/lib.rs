//! slirc-presence - IRC presence tracking engine.
//!
//! Tracks whether watched nicks are online, away or offline over a single
//! client connection, using whichever mechanism the server supports:
//! IRCv3 `MONITOR`, `WATCH`, or `ISON` polling as the universal fallback.
//! Also manages the local user's away state, answers blocking WHOIS
//! queries, and serves a cached channel list.
//!
//! The engine is transport-agnostic: feed it [`IrcEvent`]s through
//! [`Connection::dispatch`] and give it a [`Transport`] to send lines with.

pub mod cache;
pub mod capabilities;
pub mod channel_list;
pub mod config;
pub mod connection;
pub mod error;
pub mod presence;
pub mod schedule;
pub mod signal;
pub mod telemetry;

pub use capabilities::{Mechanism, ServerCapabilities};
pub use channel_list::ChannelLister;
pub use config::{ChannelListConfig, Config, PresenceConfig};
pub use connection::{Connection, ConnectionState, IrcEvent, Transport};
pub use error::{ListError, PresenceError, ReplyError, TransportError};
pub use presence::{IrcStatus, NickSet, PresenceManager, PresenceSink, WatchStrategy};
