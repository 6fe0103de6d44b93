//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`server`]: Upstream server and identity ([`ServerConfig`])
//! - [`presence`]: Watcher selection, polling cadence and reply timeout ([`PresenceConfig`])
//! - [`listing`]: Channel list caching ([`ChannelListConfig`])
//! - [`validation`]: Startup checks

mod defaults;
mod listing;
mod presence;
mod server;
mod validation;

pub use listing::ChannelListConfig;
pub use presence::PresenceConfig;
pub use server::ServerConfig;
pub use validation::{validate, ValidationError};

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to connect to and how to register.
    pub server: ServerConfig,
    /// Presence tracking.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Channel list cache.
    #[serde(default)]
    pub channel_list: ChannelListConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn load_minimal_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
address = "irc.example.net:6667"
nick = "watcher"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.nick, "watcher");
        assert_eq!(config.server.username(), "watcher");
        assert!(config.presence.polling_enabled);
        assert_eq!(config.presence.reply_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.channel_list.expiration(), Duration::from_secs(300));
    }

    #[test]
    fn load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presence.toml");
        std::fs::write(
            &path,
            r#"
[server]
address = "irc.example.net:6697"
nick = "watcher"
username = "w"
realname = "Presence Watcher"
password = "hunter2"

[presence]
polling_enabled = false
poll_initial_delay_secs = 1
poll_interval_secs = 30
reply_timeout_secs = 0
watch = ["alice", "bob"]

[channel_list]
expiration_secs = 60
cleanup_grace_ms = 250
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.password.as_deref(), Some("hunter2"));
        assert!(!config.presence.polling_enabled);
        assert_eq!(config.presence.reply_timeout(), None);
        assert_eq!(config.presence.poll_schedule().interval, Duration::from_secs(30));
        assert_eq!(config.presence.watch, vec!["alice", "bob"]);
        assert_eq!(config.channel_list.cleanup_grace(), Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\naddress = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
