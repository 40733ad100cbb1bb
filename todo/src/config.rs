//! Configuration management for the robotask binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::notification::DEFAULT_NOTIFICATION_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Auto-dismiss delay for notifications, in milliseconds
pub const NOTIFICATION_TIMEOUT_VAR: &str = "ROBOTASK_NOTIFICATION_TIMEOUT_MS";
/// Default tracing filter when `RUST_LOG` is unset
pub const LOG_LEVEL_VAR: &str = "ROBOTASK_LOG_LEVEL";
/// Skip confirmation prompts when true
pub const ASSUME_YES_VAR: &str = "ROBOTASK_ASSUME_YES";
/// How long to wait for pending timers on exit, in seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "ROBOTASK_SHUTDOWN_TIMEOUT_SECS";

/// Invalid configuration value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Notification auto-dismiss delay in milliseconds (default: 4000)
    pub notification_timeout_ms: u64,
    /// Log level used when `RUST_LOG` is unset (default: info)
    pub log_level: String,
    /// Answer yes to every confirmation prompt (default: false)
    pub assume_yes: bool,
    /// How long to wait for pending timers on exit, in seconds (default: 0)
    pub shutdown_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notification_timeout_ms: u64::try_from(DEFAULT_NOTIFICATION_TIMEOUT.as_millis())
                .unwrap_or(4000),
            log_level: "info".to_string(),
            assume_yes: false,
            shutdown_timeout_secs: 0,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let notification_timeout_ms = match lookup(NOTIFICATION_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(invalid(
                        NOTIFICATION_TIMEOUT_VAR,
                        raw,
                        "a positive number of milliseconds",
                    ));
                },
            },
            None => defaults.notification_timeout_ms,
        };

        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or(defaults.log_level);

        let assume_yes = match lookup(ASSUME_YES_VAR) {
            Some(raw) => {
                parse_bool(&raw).ok_or_else(|| invalid(ASSUME_YES_VAR, raw, "true or false"))?
            },
            None => defaults.assume_yes,
        };

        let shutdown_timeout_secs = match lookup(SHUTDOWN_TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| invalid(SHUTDOWN_TIMEOUT_VAR, raw, "a number of seconds"))?,
            None => defaults.shutdown_timeout_secs,
        };

        Ok(Self {
            notification_timeout_ms,
            log_level,
            assume_yes,
            shutdown_timeout_secs,
        })
    }

    /// Notification auto-dismiss delay
    #[must_use]
    pub const fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

fn invalid(key: &'static str, value: String, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { key, value, reason }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
