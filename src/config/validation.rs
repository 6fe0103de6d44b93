//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use slirc_wire::validate_nick;
use thiserror::Error;

use super::Config;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.address is required")]
    MissingAddress,
    #[error("server.address must be host:port, got '{0}'")]
    InvalidAddress(String),
    #[error("server.nick is invalid: {0}")]
    InvalidNick(String),
    #[error("presence.watch contains an invalid nick: {0}")]
    InvalidWatchNick(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let address = &config.server.address;
    if address.is_empty() {
        errors.push(ValidationError::MissingAddress);
    } else if !address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
    {
        errors.push(ValidationError::InvalidAddress(address.clone()));
    }

    if let Err(e) = validate_nick(&config.server.nick, None) {
        errors.push(ValidationError::InvalidNick(e.to_string()));
    }

    for nick in &config.presence.watch {
        if let Err(e) = validate_nick(nick, None) {
            errors.push(ValidationError::InvalidWatchNick(e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
