//! Unified error handling for slirc-presence.
//!
//! Errors are split by blast radius: [`TransportError`] for a failed send,
//! [`ReplyError`] for a blocking call whose reply never resolved to a value,
//! and the per-operation [`PresenceError`] / [`ListError`] that callers see.

use std::time::Duration;

use slirc_wire::NickError;
use thiserror::Error;

use crate::signal::WaitError;

// ============================================================================
// Transport
// ============================================================================

/// Failure to hand a line to the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("line of {len} bytes exceeds protocol limit of {limit}")]
    LineTooLong { len: usize, limit: usize },
}

// ============================================================================
// Blocking replies (WHOIS, LIST)
// ============================================================================

/// Why a blocking query did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("local user quit")]
    LocalQuit,

    #[error("server error: {0}")]
    Server(String),

    #[error("client error: {0}")]
    Client(String),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The reply listener went away without completing.
    #[error("reply handler dropped without completing")]
    Abandoned,
}

impl From<WaitError> for ReplyError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Timeout(after) => Self::Timeout(after),
            WaitError::Abandoned => Self::Abandoned,
        }
    }
}

// ============================================================================
// Presence operations
// ============================================================================

/// Errors from [`crate::PresenceManager`] operations.
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("invalid nick: {0}")]
    InvalidNick(#[from] NickError),

    #[error("away message must not be empty")]
    EmptyAwayMessage,

    #[error("away message is {len} characters, server allows {max}")]
    AwayMessageTooLong { len: usize, max: usize },

    #[error("send failed: {0}")]
    Transport(#[from] TransportError),

    #[error("query failed: {0}")]
    Reply(#[from] ReplyError),
}

impl From<WaitError> for PresenceError {
    fn from(err: WaitError) -> Self {
        Self::Reply(err.into())
    }
}

impl PresenceError {
    /// Static label for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNick(_) => "invalid_nick",
            Self::EmptyAwayMessage => "empty_away_message",
            Self::AwayMessageTooLong { .. } => "away_message_too_long",
            Self::Transport(_) => "transport",
            Self::Reply(ReplyError::Timeout(_)) => "timeout",
            Self::Reply(_) => "reply_failed",
        }
    }
}

// ============================================================================
// Channel listing
// ============================================================================

/// Errors from [`crate::ChannelLister::list`].
#[derive(Debug, Error)]
pub enum ListError {
    #[error("send failed: {0}")]
    Transport(#[from] TransportError),

    #[error("channel list failed: {0}")]
    Reply(#[from] ReplyError),
}

impl From<WaitError> for ListError {
    fn from(err: WaitError) -> Self {
        Self::Reply(err.into())
    }
}
