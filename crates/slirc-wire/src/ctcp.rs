//! Minimal CTCP handling.
//!
//! The presence engine only needs to tell `/me` actions apart from plain
//! messages, so this module recognises the ACTION framing and nothing else.

const DELIM: char = '\x01';

/// Extract the text of a CTCP ACTION (`\x01ACTION waves\x01`).
///
/// The closing delimiter is optional; some clients omit it.
pub fn action_text(text: &str) -> Option<&str> {
    let body = text.strip_prefix(DELIM)?;
    let body = body.strip_suffix(DELIM).unwrap_or(body);
    let rest = body.strip_prefix("ACTION")?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ')
}

/// True if the text is framed as any CTCP request.
pub fn is_ctcp(text: &str) -> bool {
    text.starts_with(DELIM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_action() {
        assert_eq!(action_text("\x01ACTION waves\x01"), Some("waves"));
        assert_eq!(action_text("\x01ACTION waves"), Some("waves"));
        assert_eq!(action_text("\x01ACTION\x01"), Some(""));
    }

    #[test]
    fn ignores_other_ctcp_and_plain_text() {
        assert_eq!(action_text("\x01VERSION\x01"), None);
        assert_eq!(action_text("\x01ACTIONS\x01"), None);
        assert_eq!(action_text("ACTION waves"), None);
        assert!(is_ctcp("\x01PING 123\x01"));
        assert!(!is_ctcp("hello"));
    }
}
