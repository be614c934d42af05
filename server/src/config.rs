//! Server configuration module.
//!
//! This module provides configuration loading for the social server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `SOCIAL_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `SOCIAL_TIMELINE_SELF_CAP`: Own posts fetched per timeline (default: `50`)
//! - `SOCIAL_TIMELINE_FRIEND_CAP`: Posts fetched per friend (default: `20`)
//! - `SOCIAL_TIMELINE_DEFAULT_LIMIT`: Timeline length when the request gives none (default: `50`)
//! - `SOCIAL_SEARCH_DEFAULT_LIMIT`: Search results when the request gives none (default: `50`)
//! - `SOCIAL_SUGGESTION_DEFAULT_LIMIT`: Suggestions when the request gives none (default: `10`)
//!
//! # Invariants
//!
//! - `listen_port` is always a valid port number (1-65535)
//! - every cap and limit is at least 1

use crate::services::TimelineConfig;

/// Server configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()`:
/// - `listen_port` is in the valid range (1-65535)
/// - every cap and limit is positive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Per-author post caps used when assembling timelines.
    pub timeline: TimelineConfig,
    pub timeline_default_limit: usize,
    pub search_default_limit: usize,
    pub suggestion_default_limit: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: Self::DEFAULT_PORT,
            timeline: TimelineConfig::default(),
            timeline_default_limit: Self::DEFAULT_TIMELINE_LIMIT,
            search_default_limit: Self::DEFAULT_SEARCH_LIMIT,
            suggestion_default_limit: Self::DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_TIMELINE_LIMIT: usize = 50;
    pub const DEFAULT_SEARCH_LIMIT: usize = 50;
    pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid value for it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            listen_port: load_listen_port(&lookup)?,
            timeline: TimelineConfig {
                self_cap: load_positive(
                    &lookup,
                    "SOCIAL_TIMELINE_SELF_CAP",
                    TimelineConfig::DEFAULT_SELF_CAP,
                )?,
                friend_cap: load_positive(
                    &lookup,
                    "SOCIAL_TIMELINE_FRIEND_CAP",
                    TimelineConfig::DEFAULT_FRIEND_CAP,
                )?,
            },
            timeline_default_limit: load_positive(
                &lookup,
                "SOCIAL_TIMELINE_DEFAULT_LIMIT",
                Self::DEFAULT_TIMELINE_LIMIT,
            )?,
            search_default_limit: load_positive(
                &lookup,
                "SOCIAL_SEARCH_DEFAULT_LIMIT",
                Self::DEFAULT_SEARCH_LIMIT,
            )?,
            suggestion_default_limit: load_positive(
                &lookup,
                "SOCIAL_SUGGESTION_DEFAULT_LIMIT",
                Self::DEFAULT_SUGGESTION_LIMIT,
            )?,
        })
    }
}

/// Load the listen port.
///
/// Returns the default if not set.
fn load_listen_port(lookup: &impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
    const NAME: &str = "SOCIAL_LISTEN_PORT";
    match lookup(NAME) {
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(ConfigError::InvalidValue {
                name: NAME.to_string(),
                message: format!("'{value}' is not a valid port number (must be 1-65535)"),
            }),
        },
        None => Ok(ServerConfig::DEFAULT_PORT),
    }
}

/// Load a positive count, returning `default` if not set.
fn load_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match lookup(name) {
        Some(value) => match value.parse::<usize>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a positive integer"),
            }),
        },
        None => Ok(default),
    }
}
