//! Owned IRC messages and the nom-based line parser.
//!
//! IRC message format:
//! ```text
//! [@tags] [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! Tags are accepted and discarded; nothing in the presence engine reads them.

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::WireError;
use crate::numeric::Numeric;
use crate::prefix::Prefix;

/// A parsed IRC message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message origin, if the line carried one.
    pub prefix: Option<Prefix>,
    /// Command name, uppercased, or a three-digit numeric.
    pub command: String,
    /// Parameters, trailing parameter last.
    pub params: Vec<String>,
}

impl Message {
    /// Build a message without a prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    /// Attach a prefix.
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Get parameter `idx`, if present.
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.params.get(idx).map(String::as_str)
    }

    /// The numeric code, if the command is a three-digit reply.
    pub fn code(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// The typed numeric, if the code is one this crate knows.
    pub fn numeric(&self) -> Option<Numeric> {
        self.code().and_then(Numeric::from_code)
    }

    /// Nick of the sender, if the prefix is a user mask.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }
}

impl FromStr for Message {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(WireError::EmptyMessage);
        }

        let (_, parsed) = parse_message(line).map_err(|_| WireError::Malformed {
            line: line.to_string(),
            reason: "missing or invalid command",
        })?;

        Ok(Message {
            prefix: parsed.prefix.map(Prefix::parse),
            command: parsed.command.to_ascii_uppercase(),
            params: parsed.params.iter().map(|p| p.to_string()).collect(),
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;

        let last = self.params.len().saturating_sub(1);
        for (idx, param) in self.params.iter().enumerate() {
            let needs_colon =
                idx == last && (param.is_empty() || param.contains(' ') || param.starts_with(':'));
            if needs_colon {
                write!(f, " :{param}")?;
            } else {
                write!(f, " {param}")?;
            }
        }
        Ok(())
    }
}

struct ParsedMessage<'a> {
    prefix: Option<&'a str>,
    command: &'a str,
    params: SmallVec<[&'a str; 15]>,
}

fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// RFC 2812: command = 1*letter / 3digit
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Collapses repeated spaces; stops after 15 parameters.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') && params.len() < 15 {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

fn parse_message(input: &str) -> IResult<&str, ParsedMessage<'_>> {
    let (input, _) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    let params = parse_params(input);

    Ok((
        "",
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_with_trailing() {
        let msg: Message = ":irc.example.net 303 me :alice bob\r\n".parse().unwrap();
        assert_eq!(msg.prefix, Some(Prefix::Server("irc.example.net".into())));
        assert_eq!(msg.code(), Some(303));
        assert_eq!(msg.params, vec!["me", "alice bob"]);
    }

    #[test]
    fn parses_tagged_user_message() {
        let msg: Message = "@time=2024-01-01T00:00:00Z :alice!a@h PRIVMSG #rust :hi there"
            .parse()
            .unwrap();
        assert_eq!(msg.source_nick(), Some("alice"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.arg(0), Some("#rust"));
        assert_eq!(msg.arg(1), Some("hi there"));
    }

    #[test]
    fn command_is_uppercased() {
        let msg: Message = "ping :token".parse().unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.code(), None);
    }

    #[test]
    fn collapses_repeated_spaces() {
        let msg: Message = ":srv.net 005  me   AWAYLEN=200 :are supported".parse().unwrap();
        assert_eq!(msg.params, vec!["me", "AWAYLEN=200", "are supported"]);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!("".parse::<Message>(), Err(WireError::EmptyMessage)));
        assert!(matches!(
            ":prefix.only".parse::<Message>(),
            Err(WireError::Malformed { .. })
        ));
        assert!(matches!("12 foo".parse::<Message>(), Err(WireError::Malformed { .. })));
    }

    #[test]
    fn display_adds_colon_for_trailing_spaces() {
        let msg = Message::new("AWAY", vec!["gone fishing".into()]);
        assert_eq!(msg.to_string(), "AWAY :gone fishing");

        let msg = Message::new("WHOIS", vec!["alice".into()]);
        assert_eq!(msg.to_string(), "WHOIS alice");
    }
}
