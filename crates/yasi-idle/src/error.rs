//! Error types for idle runs.

use thiserror::Error;
use yasi_fetch::FetchError;
use yasi_types::{AppId, ConfigError};

use crate::SessionError;

/// Errors that stop an idle run before or while it starts.
///
/// Failures inside the idle loop never surface here; they are logged and
/// retried on the next cycle.
#[derive(Error, Debug)]
pub enum IdleError {
    /// The target cannot be evaluated under the current configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The card count at startup could not be read.
    #[error("Failed to get the initial card count for app {app_id}: {source}")]
    InitialCount {
        /// The game being idled.
        app_id: AppId,
        /// The fetch failure.
        source: FetchError,
    },

    /// The game session could not be opened.
    #[error("Failed to start the game session: {0}")]
    Session(#[from] SessionError),
}

impl IdleError {
    /// Returns true if the error came from the session adapter.
    #[must_use]
    pub const fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

/// Result type for idle operations.
pub type Result<T> = std::result::Result<T, IdleError>;
