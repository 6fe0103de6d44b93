//! Watch lists and live views over them.
//!
//! A [`NickSet`] is keyed by the RFC 1459 casefolded nick and remembers the
//! spelling it was added with; updates are always reported in that spelling.
//! Iteration goes through [`NickSource::snapshot`], which copies under the
//! read lock so callers never iterate while another task mutates.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slirc_wire::irc_to_lower;

/// Read access to a set of nicks.
pub trait NickSource: Send + Sync {
    /// Current members, in the spelling they were added with.
    fn snapshot(&self) -> Vec<String>;

    fn contains(&self, nick: &str) -> bool;

    /// The stored spelling of `nick`, if it is a member.
    fn canonical(&self, nick: &str) -> Option<String>;

    fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

/// Case-insensitive nick set with interior locking.
#[derive(Debug, Default)]
pub struct NickSet {
    nicks: RwLock<BTreeMap<String, String>>,
}

impl NickSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nicks<I, S>(nicks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = Self::new();
        for nick in nicks {
            set.insert(nick);
        }
        set
    }

    /// Add a nick. Returns `false` if an equivalent nick was present.
    pub fn insert(&self, nick: impl Into<String>) -> bool {
        let nick = nick.into();
        let key = irc_to_lower(&nick);
        let mut nicks = self.nicks.write();
        if nicks.contains_key(&key) {
            return false;
        }
        nicks.insert(key, nick);
        true
    }

    /// Add a nick only while the set holds fewer than `capacity` nicks.
    /// Returns `true` if it was added; the size check and the insert happen
    /// under one lock.
    pub fn insert_bounded(&self, nick: impl Into<String>, capacity: usize) -> bool {
        let nick = nick.into();
        let key = irc_to_lower(&nick);
        let mut nicks = self.nicks.write();
        if nicks.len() >= capacity || nicks.contains_key(&key) {
            return false;
        }
        nicks.insert(key, nick);
        true
    }

    /// Remove a nick. Returns `false` if it was not present.
    pub fn remove(&self, nick: &str) -> bool {
        self.nicks.write().remove(&irc_to_lower(nick)).is_some()
    }

    pub fn len(&self) -> usize {
        self.nicks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nicks.read().is_empty()
    }

    pub fn clear(&self) {
        self.nicks.write().clear();
    }
}

impl NickSource for NickSet {
    fn snapshot(&self) -> Vec<String> {
        self.nicks.read().values().cloned().collect()
    }

    fn contains(&self, nick: &str) -> bool {
        self.nicks.read().contains_key(&irc_to_lower(nick))
    }

    fn canonical(&self, nick: &str) -> Option<String> {
        self.nicks.read().get(&irc_to_lower(nick)).cloned()
    }

    fn is_empty(&self) -> bool {
        self.nicks.read().is_empty()
    }
}

/// Live `all - excluded` view. Nothing is cached; every call reads both sets.
#[derive(Clone)]
pub struct Difference {
    all: Arc<dyn NickSource>,
    excluded: Arc<dyn NickSource>,
}

impl Difference {
    pub fn new(all: Arc<dyn NickSource>, excluded: Arc<dyn NickSource>) -> Self {
        Self { all, excluded }
    }
}

impl NickSource for Difference {
    fn snapshot(&self) -> Vec<String> {
        self.all
            .snapshot()
            .into_iter()
            .filter(|nick| !self.excluded.contains(nick))
            .collect()
    }

    fn contains(&self, nick: &str) -> bool {
        self.all.contains(nick) && !self.excluded.contains(nick)
    }

    fn canonical(&self, nick: &str) -> Option<String> {
        if self.excluded.contains(nick) {
            return None;
        }
        self.all.canonical(nick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_case_insensitive_and_keeps_first_spelling() {
        let set = NickSet::new();
        assert!(set.insert("Alice"));
        assert!(!set.insert("aLICE"));
        assert!(set.contains("ALICE"));
        assert_eq!(set.canonical("alice").as_deref(), Some("Alice"));
        assert_eq!(set.snapshot(), vec!["Alice".to_string()]);
    }

    #[test]
    fn bounded_insert_stops_at_capacity() {
        let set = NickSet::new();
        assert!(set.insert_bounded("alice", 2));
        assert!(!set.insert_bounded("ALICE", 2));
        assert!(set.insert_bounded("bob", 2));
        assert!(!set.insert_bounded("carol", 2));
        assert_eq!(set.len(), 2);

        set.remove("alice");
        assert!(set.insert_bounded("carol", 2));
    }

    #[test]
    fn rfc1459_brackets_fold() {
        let set = NickSet::from_nicks(["[bob]"]);
        assert!(set.contains("{BOB}"));
        assert!(set.remove("{bob}"));
        assert!(set.is_empty());
        assert!(!set.remove("[bob]"));
    }

    #[test]
    fn difference_tracks_both_sets() {
        let all = Arc::new(NickSet::from_nicks(["alice", "bob", "carol"]));
        let subscribed = Arc::new(NickSet::from_nicks(["bob"]));
        let view = Difference::new(all.clone(), subscribed.clone());

        assert_eq!(view.snapshot(), vec!["alice".to_string(), "carol".to_string()]);
        assert!(!view.contains("bob"));
        assert_eq!(view.canonical("BOB"), None);

        subscribed.insert("alice");
        all.insert("dave");
        assert_eq!(view.snapshot(), vec!["carol".to_string(), "dave".to_string()]);

        subscribed.clear();
        all.remove("carol");
        assert_eq!(view.snapshot().len(), 3);
        assert!(view.contains("Bob"));
    }
}
