//! Upstream server configuration.

use serde::Deserialize;

use super::defaults::default_realname;

/// Where to connect and how to register.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the IRC server.
    pub address: String,
    /// Nick to register with.
    pub nick: String,
    /// Ident; defaults to the nick.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Connection password sent with PASS.
    #[serde(default)]
    pub password: Option<String>,
}

impl ServerConfig {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }
}
