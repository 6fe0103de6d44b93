//! Channel list cache configuration.

use std::time::Duration;

use serde::Deserialize;

use super::defaults::{default_cleanup_grace_ms, default_list_expiration, default_reply_timeout};

/// Channel list cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListConfig {
    /// Seconds a fetched list is served from cache (default: 300).
    #[serde(default = "default_list_expiration")]
    pub expiration_secs: u64,
    /// Extra milliseconds after expiry before the cached list is dropped
    /// (default: 1000).
    #[serde(default = "default_cleanup_grace_ms")]
    pub cleanup_grace_ms: u64,
    /// Seconds a LIST waits for its end marker; 0 waits forever (default: 60).
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,
}

impl Default for ChannelListConfig {
    fn default() -> Self {
        Self {
            expiration_secs: default_list_expiration(),
            cleanup_grace_ms: default_cleanup_grace_ms(),
            reply_timeout_secs: default_reply_timeout(),
        }
    }
}

impl ChannelListConfig {
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }

    pub fn cleanup_grace(&self) -> Duration {
        Duration::from_millis(self.cleanup_grace_ms)
    }

    /// `None` means wait indefinitely.
    pub fn reply_timeout(&self) -> Option<Duration> {
        (self.reply_timeout_secs > 0).then(|| Duration::from_secs(self.reply_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_correct() {
        let config = ChannelListConfig::default();
        assert_eq!(config.expiration(), Duration::from_secs(300));
        assert_eq!(config.cleanup_grace(), Duration::from_secs(1));
        assert_eq!(config.reply_timeout(), Some(Duration::from_secs(60)));
    }
}
