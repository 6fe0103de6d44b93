//! Standardized span constructors for presence observability.

pub mod spans {
    use tracing::{info_span, Span};

    /// Span for a server connection.
    pub fn connection(address: &str, nick: &str) -> Span {
        info_span!("connection", address = %address, nick = %nick)
    }

    /// Span for a blocking WHOIS query.
    pub fn whois(nick: &str) -> Span {
        info_span!("whois", nick = %nick)
    }

    /// Span for a channel list fetch.
    pub fn list() -> Span {
        info_span!("list")
    }
}
