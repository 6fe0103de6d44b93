//! # slirc-wire
//!
//! Client-side IRC wire helpers used by the presence engine.
//!
//! ## Features
//!
//! - Lenient parsing of server lines into owned [`Message`] values
//! - Typed numeric replies for the presence-related numerics ([`Numeric`])
//! - RPL_ISUPPORT accumulation and typed lookups ([`Isupport`])
//! - RFC 1459 case mapping and nick validation
//! - Builders for the outgoing commands the presence engine emits
//! - Optional tokio line codec (`tokio` feature)
//!
//! ## Parsing a server line
//!
//! ```rust
//! use slirc_wire::{Message, Numeric};
//!
//! let msg: Message = ":irc.example.net 303 me :alice bob".parse().unwrap();
//! assert_eq!(msg.numeric(), Some(Numeric::RPL_ISON));
//! assert_eq!(msg.arg(1), Some("alice bob"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod ctcp;
pub mod error;
pub mod isupport;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;
pub mod numeric;
pub mod prefix;

pub use self::command::MAX_LINE_LEN;
pub use self::error::{NickError, WireError};
pub use self::isupport::{parse_chanlimit, Isupport};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::nick::{
    irc_eq, irc_lower_char, irc_to_lower, nick_of_mask, validate_nick, MAX_NICK_LEN,
};
pub use self::numeric::Numeric;
pub use self::prefix::Prefix;
