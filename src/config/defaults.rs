//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_realname() -> String {
    "slirc-presence".to_string()
}

// =============================================================================
// Presence Defaults
// =============================================================================

pub fn default_poll_initial_delay() -> u64 {
    10
}

pub fn default_poll_interval() -> u64 {
    60
}

/// Seconds a WHOIS or LIST waits for its reply. Zero waits forever.
pub fn default_reply_timeout() -> u64 {
    60
}

// =============================================================================
// Channel List Defaults
// =============================================================================

pub fn default_list_expiration() -> u64 {
    300
}

pub fn default_cleanup_grace_ms() -> u64 {
    1000
}
