//! On-disk record format.

use std::str::FromStr;
use thiserror::Error;
use yasi_types::{AppId, TargetSpec, TargetSpecError};

/// Errors found while parsing a persisted record line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordFormatError {
    /// The line does not have exactly three fields.
    #[error("expected 3 fields, got {0}")]
    FieldCount(usize),

    /// The app id field is not a number.
    #[error("invalid app id '{0}'")]
    AppId(String),

    /// The target field is not a valid target expression.
    #[error("invalid target: {0}")]
    Target(#[from] TargetSpecError),

    /// The seconds field is not a non-negative integer.
    #[error("invalid seconds '{0}'")]
    Seconds(String),
}

/// Idle progress saved for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedProgress {
    /// The game the progress belongs to.
    pub app_id: AppId,
    /// The target still to be reached, always in remaining mode when written by the idler.
    pub target: TargetSpec,
    /// Seconds already idled toward the next drop.
    pub seconds_idled: u64,
}

impl SavedProgress {
    /// Creates a record.
    #[must_use]
    pub const fn new(app_id: AppId, target: TargetSpec, seconds_idled: u64) -> Self {
        Self {
            app_id,
            target,
            seconds_idled,
        }
    }

    /// Formats the record as a single line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{} {} {}", self.app_id, self.target, self.seconds_idled)
    }
}

impl FromStr for SavedProgress {
    type Err = RecordFormatError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [app_id, target, seconds] = fields[..] else {
            return Err(RecordFormatError::FieldCount(fields.len()));
        };

        Ok(Self {
            app_id: app_id
                .parse()
                .map_err(|_| RecordFormatError::AppId(app_id.to_string()))?,
            target: target.parse()?,
            seconds_idled: seconds
                .parse()
                .map_err(|_| RecordFormatError::Seconds(seconds.to_string()))?,
        })
    }
}
