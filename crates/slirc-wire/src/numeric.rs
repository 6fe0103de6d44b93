//! Numeric replies the presence engine reacts to.
//!
//! Only the numerics that carry presence, away, WHOIS, LIST or ISUPPORT
//! information are modelled; everything else stays a bare `u16`.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - IRCv3 MONITOR: <https://ircv3.net/specs/extensions/monitor>

#![allow(non_camel_case_types)]

/// A known IRC numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Numeric {
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,
    /// 301 - Target user is away
    RPL_AWAY = 301,
    /// 303 - ISON reply
    RPL_ISON = 303,
    /// 305 - You are no longer marked as being away
    RPL_UNAWAY = 305,
    /// 306 - You have been marked as being away
    RPL_NOWAWAY = 306,
    /// 311 - WHOIS user info
    RPL_WHOISUSER = 311,
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318,
    /// 321 - Start of LIST
    RPL_LISTSTART = 321,
    /// 322 - LIST entry
    RPL_LIST = 322,
    /// 323 - End of LIST
    RPL_LISTEND = 323,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 422 - MOTD file is missing
    ERR_NOMOTD = 422,
    /// 512 - WATCH list is full
    ERR_TOOMANYWATCH = 512,
    /// 600 - WATCH: user logged on
    RPL_LOGON = 600,
    /// 601 - WATCH: user logged off
    RPL_LOGOFF = 601,
    /// 602 - WATCH: stopped watching
    RPL_WATCHOFF = 602,
    /// 604 - WATCH: user is online
    RPL_NOWON = 604,
    /// 605 - WATCH: user is offline
    RPL_NOWOFF = 605,
    /// 730 - MONITOR: targets online
    RPL_MONONLINE = 730,
    /// 731 - MONITOR: targets offline
    RPL_MONOFFLINE = 731,
    /// 732 - MONITOR list entry
    RPL_MONLIST = 732,
    /// 733 - End of MONITOR list
    RPL_ENDOFMONLIST = 733,
    /// 734 - MONITOR list is full
    ERR_MONLISTFULL = 734,
}

impl Numeric {
    /// Map a raw code to a known numeric.
    pub fn from_code(code: u16) -> Option<Self> {
        use Numeric::*;
        let numeric = match code {
            1 => RPL_WELCOME,
            5 => RPL_ISUPPORT,
            301 => RPL_AWAY,
            303 => RPL_ISON,
            305 => RPL_UNAWAY,
            306 => RPL_NOWAWAY,
            311 => RPL_WHOISUSER,
            318 => RPL_ENDOFWHOIS,
            321 => RPL_LISTSTART,
            322 => RPL_LIST,
            323 => RPL_LISTEND,
            376 => RPL_ENDOFMOTD,
            401 => ERR_NOSUCHNICK,
            422 => ERR_NOMOTD,
            512 => ERR_TOOMANYWATCH,
            600 => RPL_LOGON,
            601 => RPL_LOGOFF,
            602 => RPL_WATCHOFF,
            604 => RPL_NOWON,
            605 => RPL_NOWOFF,
            730 => RPL_MONONLINE,
            731 => RPL_MONOFFLINE,
            732 => RPL_MONLIST,
            733 => RPL_ENDOFMONLIST,
            734 => ERR_MONLISTFULL,
            _ => return None,
        };
        Some(numeric)
    }

    /// The three-digit code.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// True for 4xx/5xx error numerics.
    #[inline]
    pub fn is_error(self) -> bool {
        (400..600).contains(&self.code()) || self == Numeric::ERR_MONLISTFULL
    }
}
