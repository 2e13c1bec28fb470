//! Fetch error classification.

use thiserror::Error;

/// Reasons a remote lookup produced no usable reading.
///
/// None of these is ever confused with a legitimate count of zero.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Steam answered with a non-success HTTP status.
    #[error("HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Steam answered with HTTP 429; the caller should back off.
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Steam reported an error in the body, e.g. a private inventory.
    #[error("Steam reported an error: {message}")]
    Source {
        /// Steam's error message.
        message: String,
    },
}

impl FetchError {
    /// Returns true if the caller should slow down before retrying.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Returns true if Steam itself rejected the request for this inventory.
    #[must_use]
    pub const fn is_source_reported(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::Status { status: 403 })
    }

    /// Returns true if the inventory is probably private.
    #[must_use]
    pub fn is_private_hint(&self) -> bool {
        match self {
            Self::Status { status } => *status == 403,
            Self::Source { message } => message.to_lowercase().contains("private"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Transport(error)
        }
    }
}
