//! Message source prefixes.
//!
//! A prefix is either a server name or a `nick!user@host` mask. Parsing is
//! lenient: missing user or host parts are left empty.

use std::fmt;

/// Origin of an IRC message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// Server name (e.g., `irc.example.net`).
    Server(String),
    /// User mask; `user` and `host` may be empty when the server omits them.
    User {
        /// Nickname.
        nick: String,
        /// Username (ident).
        user: String,
        /// Hostname.
        host: String,
    },
}

impl Prefix {
    /// Parse a prefix string (without the leading `:`).
    ///
    /// A dot in the name part with no `!`/`@` marks a server name.
    pub fn parse(s: &str) -> Self {
        let (name, rest) = match s.find(['!', '@']) {
            Some(idx) => (&s[..idx], Some(&s[idx..])),
            None => (s, None),
        };

        let Some(rest) = rest else {
            if name.contains('.') {
                return Prefix::Server(name.to_string());
            }
            return Prefix::User {
                nick: name.to_string(),
                user: String::new(),
                host: String::new(),
            };
        };

        let (user, host) = match rest.strip_prefix('!') {
            Some(after_bang) => match after_bang.split_once('@') {
                Some((user, host)) => (user, host),
                None => (after_bang, ""),
            },
            None => ("", rest.trim_start_matches('@')),
        };

        Prefix::User {
            nick: name.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        }
    }

    /// The nickname, if this prefix names a user.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::User { nick, .. } => Some(nick),
            Prefix::Server(_) => None,
        }
    }

    /// The host part: the server name for servers, the hostname for users.
    pub fn host(&self) -> &str {
        match self {
            Prefix::Server(name) => name,
            Prefix::User { host, .. } => host,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Server(name) => f.write_str(name),
            Prefix::User { nick, user, host } => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{user}")?;
                }
                if !host.is_empty() {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_user_mask() {
        let prefix = Prefix::parse("alice!ali@host.example");
        assert_eq!(prefix.nick(), Some("alice"));
        assert_eq!(prefix.host(), "host.example");
        assert_eq!(prefix.to_string(), "alice!ali@host.example");
    }

    #[test]
    fn dotted_name_is_server() {
        let prefix = Prefix::parse("irc.example.net");
        assert_eq!(prefix, Prefix::Server("irc.example.net".into()));
        assert_eq!(prefix.host(), "irc.example.net");
        assert_eq!(prefix.nick(), None);
    }

    #[test]
    fn bare_name_is_nick() {
        let prefix = Prefix::parse("bob");
        assert_eq!(prefix.nick(), Some("bob"));
        assert_eq!(prefix.host(), "");
    }

    #[test]
    fn nick_with_host_only() {
        let prefix = Prefix::parse("carol@some.host");
        assert_eq!(prefix.nick(), Some("carol"));
        assert_eq!(prefix.host(), "some.host");
    }
}
