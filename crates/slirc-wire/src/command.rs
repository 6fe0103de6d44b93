//! Builders for outgoing client commands.
//!
//! Every builder returns the line without the trailing CRLF; the transport
//! (or [`crate::LineCodec`]) terminates it.

/// Maximum IRC line length excluding CRLF (RFC 2812: 512 including it).
pub const MAX_LINE_LEN: usize = 510;

/// `ISON nick1 nick2 ...`
pub fn ison<I, S>(nicks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::from("ISON");
    for nick in nicks {
        line.push(' ');
        line.push_str(nick.as_ref());
    }
    line
}

/// `MONITOR + a,b,c`
pub fn monitor_add<S: AsRef<str>>(nicks: &[S]) -> String {
    format!("MONITOR + {}", join(nicks, ","))
}

/// `MONITOR - a,b,c`
pub fn monitor_remove<S: AsRef<str>>(nicks: &[S]) -> String {
    format!("MONITOR - {}", join(nicks, ","))
}

/// `WATCH +a +b +c`
pub fn watch_add<S: AsRef<str>>(nicks: &[S]) -> String {
    watch(nicks, '+')
}

/// `WATCH -a -b -c`
pub fn watch_remove<S: AsRef<str>>(nicks: &[S]) -> String {
    watch(nicks, '-')
}

fn watch<S: AsRef<str>>(nicks: &[S], sign: char) -> String {
    let mut line = String::from("WATCH");
    for nick in nicks {
        line.push(' ');
        line.push(sign);
        line.push_str(nick.as_ref());
    }
    line
}

/// `AWAY :message` to set, bare `AWAY` to clear.
pub fn away(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("AWAY :{message}"),
        None => String::from("AWAY"),
    }
}

/// `WHOIS nick`
pub fn whois(nick: &str) -> String {
    format!("WHOIS {nick}")
}

/// `LIST`
pub fn list() -> String {
    String::from("LIST")
}

/// `NICK nick`
pub fn nick(nick: &str) -> String {
    format!("NICK {nick}")
}

/// `USER username 0 * :realname`
pub fn user(username: &str, realname: &str) -> String {
    format!("USER {username} 0 * :{realname}")
}

/// `PASS password`
pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

/// `PONG :token`
pub fn pong(token: &str) -> String {
    format!("PONG :{token}")
}

/// `QUIT :reason`
pub fn quit(reason: &str) -> String {
    format!("QUIT :{reason}")
}

fn join<S: AsRef<str>>(items: &[S], sep: &str) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(sep)
}
