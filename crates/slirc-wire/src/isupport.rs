//! RPL_ISUPPORT (005) accumulation.
//!
//! Servers spread their ISUPPORT tokens over several 005 lines during
//! registration. [`Isupport`] collects them into one owned table; a later
//! token with the same key replaces an earlier one and `-KEY` removes it.

use std::collections::HashMap;

/// Owned table of ISUPPORT tokens.
///
/// ```
/// use slirc_wire::Isupport;
///
/// let mut isupport = Isupport::new();
/// isupport.extend_from_args(&["me", "MONITOR=100", "EXCEPTS", "are supported by this server"]);
///
/// assert_eq!(isupport.value("MONITOR"), Some("100"));
/// assert!(isupport.contains("EXCEPTS"));
/// assert!(!isupport.contains("WATCH"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport {
    entries: Vec<(String, Option<String>)>,
}

impl Isupport {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table directly from `KEY` / `KEY=VALUE` tokens.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut isupport = Self::new();
        for token in tokens {
            isupport.apply_token(token);
        }
        isupport
    }

    /// Absorb the arguments of one RPL_ISUPPORT reply.
    ///
    /// The first argument (our nick) is skipped, as is the trailing
    /// human-readable text, which is the only argument containing spaces.
    pub fn extend_from_args<S: AsRef<str>>(&mut self, args: &[S]) {
        let Some((_target, rest)) = args.split_first() else {
            return;
        };
        for token in rest.iter().map(AsRef::as_ref) {
            if token.contains(' ') || token.starts_with(':') {
                break;
            }
            self.apply_token(token);
        }
    }

    fn apply_token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if let Some(negated) = token.strip_prefix('-') {
            self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(negated));
            return;
        }
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k, Some(v.to_string())),
            None => (token, None),
        };
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.entries.push((key.to_ascii_uppercase(), value));
    }

    /// Look up a key.
    ///
    /// Returns `Some(Some(value))` for `KEY=VALUE`, `Some(None)` for a bare
    /// `KEY`, and `None` if the server never advertised it.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref())
    }

    /// The value of a key, if present with a value.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    /// Whether the key was advertised at all.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no tokens were advertised.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Parse a `CHANLIMIT` value like `#&:20,+:` into a per-prefix map.
///
/// An empty limit means "no limit" and maps to `None`. Entries with an
/// unparsable limit are skipped.
pub fn parse_chanlimit(value: &str) -> HashMap<char, Option<usize>> {
    let mut limits = HashMap::new();
    for part in value.split(',').filter(|p| !p.is_empty()) {
        let Some((prefixes, limit)) = part.split_once(':') else {
            continue;
        };
        let limit = if limit.is_empty() {
            None
        } else {
            match limit.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => continue,
            }
        };
        for prefix in prefixes.chars() {
            limits.insert(prefix, limit);
        }
    }
    limits
}
