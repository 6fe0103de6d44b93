//! Error types for the wire crate.

use thiserror::Error;

/// Convenience type alias for Results using [`WireError`].
pub type Result<T, E = WireError> = std::result::Result<T, E>;

/// Errors raised while framing or parsing IRC lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WireError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Received bytes were not valid UTF-8.
    #[error("invalid utf-8 after {valid_up_to} bytes")]
    InvalidUtf8 {
        /// Number of leading bytes that decoded cleanly.
        valid_up_to: usize,
    },

    /// The line was empty after trimming.
    #[error("empty message")]
    EmptyMessage,

    /// The line could not be parsed as an IRC message.
    #[error("malformed message {line:?}: {reason}")]
    Malformed {
        /// The offending line.
        line: String,
        /// Short description of what was wrong.
        reason: &'static str,
    },
}

/// Reasons a nickname is rejected before being put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NickError {
    /// The nick is empty.
    #[error("nick must not be empty")]
    Empty,

    /// The nick exceeds NICKLEN, or `MAX_NICK_LEN` when none is advertised.
    #[error("nick {nick:?} is {len} characters, server allows {max}")]
    TooLong {
        /// The rejected nick.
        nick: String,
        /// Its length in characters.
        len: usize,
        /// The advertised maximum.
        max: usize,
    },

    /// The nick starts with a character that may not lead a nick.
    #[error("nick {nick:?} may not start with {ch:?}")]
    IllegalStart {
        /// The rejected nick.
        nick: String,
        /// The offending leading character.
        ch: char,
    },

    /// The nick contains a character that would break the command grammar.
    #[error("nick {nick:?} contains illegal character {ch:?}")]
    IllegalChar {
        /// The rejected nick.
        nick: String,
        /// The offending character.
        ch: char,
    },
}
