//! Nickname handling: RFC 1459 case mapping and validation.
//!
//! IRC compares nicks case-insensitively with a few extra equivalences
//! (`[` ~ `{`, `]` ~ `}`, `\` ~ `|`, `~` ~ `^`).

use crate::error::NickError;

/// Characters that lead channel names and therefore can't lead a nick.
const CHANNEL_SIGILS: [char; 4] = ['#', '&', '+', '!'];

/// Lowercase a single character using RFC 1459 case mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Lowercase a string using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive equality under RFC 1459 case mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Nick part of a `nick!user@host` target as sent in MONITOR replies.
pub fn nick_of_mask(mask: &str) -> &str {
    match mask.find(['!', '@']) {
        Some(idx) => &mask[..idx],
        None => mask,
    }
}

/// Longest nick accepted when the server advertises no NICKLEN. Keeps any
/// single nick well inside one multi-target line.
pub const MAX_NICK_LEN: usize = 64;

/// Check that a nick can be safely sent as a command parameter.
///
/// `max_len` is the server's NICKLEN, if advertised; otherwise
/// [`MAX_NICK_LEN`] applies.
pub fn validate_nick(nick: &str, max_len: Option<usize>) -> Result<&str, NickError> {
    let first = nick.chars().next().ok_or(NickError::Empty)?;

    if CHANNEL_SIGILS.contains(&first) || first.is_ascii_digit() || first == '-' || first == ':' {
        return Err(NickError::IllegalStart {
            nick: nick.to_string(),
            ch: first,
        });
    }

    if let Some(ch) = nick
        .chars()
        .find(|c| matches!(c, ' ' | ',' | '*' | '?' | '!' | '@') || c.is_control())
    {
        return Err(NickError::IllegalChar {
            nick: nick.to_string(),
            ch,
        });
    }

    let max = max_len.unwrap_or(MAX_NICK_LEN);
    let len = nick.chars().count();
    if len > max {
        return Err(NickError::TooLong {
            nick: nick.to_string(),
            len,
            max,
        });
    }

    Ok(nick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_special_chars() {
        assert_eq!(irc_to_lower("Nick[Away]"), "nick{away}");
        assert_eq!(irc_to_lower("A\\B~C"), "a|b^c");
    }

    #[test]
    fn compares_case_insensitively() {
        assert!(irc_eq("Alice", "aLICE"));
        assert!(irc_eq("dev[1]", "DEV{1}"));
        assert!(!irc_eq("alice", "alicia"));
    }

    #[test]
    fn strips_mask_suffix() {
        assert_eq!(nick_of_mask("alice!a@host"), "alice");
        assert_eq!(nick_of_mask("bob@host"), "bob");
        assert_eq!(nick_of_mask("carol"), "carol");
    }

    #[test]
    fn validates_nicks() {
        assert_eq!(validate_nick("alice", None), Ok("alice"));
        assert_eq!(validate_nick("", None), Err(NickError::Empty));
        assert!(matches!(
            validate_nick("#chan", None),
            Err(NickError::IllegalStart { ch: '#', .. })
        ));
        assert!(matches!(
            validate_nick("9lives", None),
            Err(NickError::IllegalStart { ch: '9', .. })
        ));
        assert!(matches!(
            validate_nick("two words", None),
            Err(NickError::IllegalChar { ch: ' ', .. })
        ));
        assert!(matches!(
            validate_nick("averylongnick", Some(9)),
            Err(NickError::TooLong { len: 13, max: 9, .. })
        ));
        assert_eq!(validate_nick("[m]", Some(9)), Ok("[m]"));
    }

    #[test]
    fn caps_length_without_nicklen() {
        let longest = "a".repeat(MAX_NICK_LEN);
        assert_eq!(validate_nick(&longest, None), Ok(longest.as_str()));

        let too_long = "a".repeat(MAX_NICK_LEN + 1);
        assert!(matches!(
            validate_nick(&too_long, None),
            Err(NickError::TooLong { max: MAX_NICK_LEN, .. })
        ));
        // An advertised NICKLEN overrides the cap either way.
        assert!(validate_nick(&too_long, Some(100)).is_ok());
    }
}
