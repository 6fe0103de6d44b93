//! Time-bounded value container.
//!
//! [`Expiring`] holds one value plus the monotonic instant it was stored.
//! It is not synchronized; owners wrap it in a lock and perform every read,
//! write and cleanup under that lock.
//!
//! Cleanup is keyed on [`Stamp`] identity: a cleanup task captures the stamp
//! returned by [`Expiring::set`] and later calls
//! [`Expiring::clear_if_stamped`], which only clears if no newer value has
//! been stored in the meantime.

use tokio::time::{Duration, Instant};

/// Identity of one stored value: when it was stored and which store it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp {
    at: Instant,
    generation: u64,
}

impl Stamp {
    /// Monotonic instant the value was stored.
    pub fn at(&self) -> Instant {
        self.at
    }
}

/// A value that is only handed out while younger than a caller-given age.
#[derive(Debug)]
pub struct Expiring<T> {
    value: Option<T>,
    stamp: Option<Stamp>,
    generation: u64,
}

impl<T> Default for Expiring<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Expiring<T> {
    /// An empty container.
    pub const fn new() -> Self {
        Self {
            value: None,
            stamp: None,
            generation: 0,
        }
    }

    /// Store a value stamped with the current instant.
    pub fn set(&mut self, value: T) -> Stamp {
        self.generation += 1;
        let stamp = Stamp {
            at: Instant::now(),
            generation: self.generation,
        };
        self.value = Some(value);
        self.stamp = Some(stamp);
        stamp
    }

    /// The value, if one is stored and `now - stored <= max_age`.
    ///
    /// A stale value is not cleared.
    pub fn get(&self, max_age: Duration) -> Option<&T> {
        let stamp = self.stamp?;
        if stamp.at.elapsed() <= max_age {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Stamp of the stored value.
    pub fn timestamp(&self) -> Option<Stamp> {
        self.stamp
    }

    /// Drop the stored value.
    pub fn clear(&mut self) {
        self.value = None;
        self.stamp = None;
    }

    /// Drop the stored value only if it is the one identified by `stamp`.
    pub fn clear_if_stamped(&mut self, stamp: Stamp) -> bool {
        if self.stamp == Some(stamp) {
            self.clear();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fresh_value_is_returned() {
        let mut cache = Expiring::new();
        cache.set(vec!["#rust"]);
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(Duration::from_secs(300)), Some(&vec!["#rust"]));
    }

    #[tokio::test(start_paused = true)]
    async fn age_equal_to_bound_is_fresh() {
        let mut cache = Expiring::new();
        cache.set(1);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get(Duration::from_secs(60)), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_value_is_hidden_not_cleared() {
        let mut cache = Expiring::new();
        let stamp = cache.set(1);
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get(Duration::from_secs(60)), None);
        assert_eq!(cache.timestamp(), Some(stamp));
        assert_eq!(cache.get(Duration::from_secs(120)), Some(&1));
    }

    #[test]
    fn empty_container_returns_nothing() {
        let cache: Expiring<u8> = Expiring::new();
        assert_eq!(cache.get(Duration::MAX), None);
        assert_eq!(cache.timestamp(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_of_superseded_value_is_noop() {
        let mut cache = Expiring::new();
        let first = cache.set("old");
        tokio::time::advance(Duration::from_secs(10)).await;
        let second = cache.set("new");

        assert!(!cache.clear_if_stamped(first));
        assert_eq!(cache.get(Duration::from_secs(60)), Some(&"new"));

        assert!(cache.clear_if_stamped(second));
        assert_eq!(cache.get(Duration::MAX), None);
    }

    #[test]
    fn same_instant_sets_have_distinct_stamps() {
        let mut cache = Expiring::new();
        let first = cache.set(1);
        let second = cache.set(2);
        assert_ne!(first, second);
        assert!(!cache.clear_if_stamped(first));
    }
}
