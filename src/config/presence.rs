//! Presence tracking configuration.

use std::time::Duration;

use serde::Deserialize;

use super::defaults::{
    default_poll_initial_delay, default_poll_interval, default_reply_timeout, default_true,
};
use crate::presence::PollSchedule;

/// Presence tracking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    /// Use ISON polling, alone when the server has neither MONITOR nor
    /// WATCH, or alongside them for nicks that don't fit their lists.
    #[serde(default = "default_true")]
    pub polling_enabled: bool,
    /// Seconds before the first ISON round (default: 10).
    #[serde(default = "default_poll_initial_delay")]
    pub poll_initial_delay_secs: u64,
    /// Seconds between ISON rounds (default: 60).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Seconds a WHOIS query waits for its reply; 0 waits forever (default: 60).
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,
    /// Nicks to watch from startup.
    #[serde(default)]
    pub watch: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            polling_enabled: true,
            poll_initial_delay_secs: default_poll_initial_delay(),
            poll_interval_secs: default_poll_interval(),
            reply_timeout_secs: default_reply_timeout(),
            watch: Vec::new(),
        }
    }
}

impl PresenceConfig {
    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule {
            initial_delay: Duration::from_secs(self.poll_initial_delay_secs),
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    /// `None` means wait indefinitely.
    pub fn reply_timeout(&self) -> Option<Duration> {
        (self.reply_timeout_secs > 0).then(|| Duration::from_secs(self.reply_timeout_secs))
    }
}
