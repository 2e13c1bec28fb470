//! Error types for yasi.

use std::path::PathBuf;
use thiserror::Error;

use crate::TargetSpec;

/// Errors returned when parsing a card target expression such as `t5` or `r2`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetSpecError {
    /// The expression has fewer than two characters.
    #[error("target '{0}' is too short (expected e.g. 't3' or 'r1')")]
    TooShort(String),

    /// The mode prefix is neither `t` nor `r`.
    #[error("invalid mode '{0}', must be 't' (total) or 'r' (remaining)")]
    InvalidMode(char),

    /// The magnitude is not a base-10 integer.
    #[error("invalid number of cards '{0}', must be an integer")]
    InvalidNumber(String),

    /// The magnitude parsed but is zero or negative.
    #[error("number of cards '{0}' must be a positive integer")]
    NonPositiveMagnitude(i64),
}

/// Errors in the static configuration or in how it combines with the requested target.
///
/// All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Inventory checking is enabled but no Steam ID is configured.
    #[error("'steam_id_64' must be set to a non-empty value when inventory checking is enabled")]
    MissingSteamId,

    /// An integer option that must be positive is zero.
    #[error("'{0}' must be a positive integer")]
    ZeroValue(&'static str),

    /// The minutes-per-card rate is not a positive number.
    #[error("'max_idle_minutes_per_card' must be positive, got {0}")]
    NonPositiveRate(f64),

    /// A total-count target was requested while inventory checking is disabled.
    #[error(
        "cannot use total target '{0}' when inventory checking is disabled, \
         use remaining mode instead (e.g. 'r3' for 3 additional cards)"
    )]
    TotalTargetWithoutInventory(TargetSpec),
}
