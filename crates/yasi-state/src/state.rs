//! State management for the resumable idle record.

use crate::{RecordFormatError, SavedProgress};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use yasi_types::AppId;

/// File name of the record inside the state directory.
const RECORD_FILE: &str = "state.txt";

/// Errors that can occur during state management operations.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to delete file '{path}': {source}")]
    DeleteFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The record exists but cannot be parsed.
    #[error("Invalid state file '{path}': {source}")]
    Malformed {
        /// The path of the record.
        path: PathBuf,
        /// What was wrong with the line.
        source: RecordFormatError,
    },
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;

/// Manages the single resumable idle record.
///
/// Only one record exists at a time; saving for a new game replaces the
/// record of any previous game.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Directory holding the record.
    base_path: PathBuf,
    /// Path of the record file.
    record_path: PathBuf,
}

impl StateStore {
    /// Creates a state store in the given directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_path: PathBuf) -> Result<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| StateError::CreateDir {
                path: base_path.clone(),
                source: e,
            })?;
        }

        let record_path = base_path.join(RECORD_FILE);
        Ok(Self {
            base_path,
            record_path,
        })
    }

    /// Returns the default directory for yasi state.
    ///
    /// Uses the `directories` crate to find the platform data directory
    /// (e.g. `~/.local/share/yasi/` on Linux), falling back to `~/.yasi/`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "yasi").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Creates a state store at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the state directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path of the record file.
    #[must_use]
    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    /// Reads the record regardless of which game it belongs to.
    ///
    /// Returns `Ok(None)` if there is no record or the file is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its first line is malformed.
    pub fn read_record(&self) -> Result<Option<SavedProgress>> {
        let content = match fs::read_to_string(&self.record_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StateError::ReadFile {
                    path: self.record_path.clone(),
                    source: e,
                });
            }
        };

        let line = content.lines().next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        line.parse()
            .map(Some)
            .map_err(|source| StateError::Malformed {
                path: self.record_path.clone(),
                source,
            })
    }

    /// Loads saved progress for `app_id`.
    ///
    /// Returns `None` when there is nothing to resume: no record, a record for
    /// another game, or a record that cannot be read (logged as a warning).
    #[must_use]
    pub fn load(&self, app_id: AppId) -> Option<SavedProgress> {
        match self.read_record() {
            Ok(Some(record)) if record.app_id == app_id => {
                info!(
                    %app_id,
                    target = %record.target,
                    seconds = record.seconds_idled,
                    "Loaded saved idle state"
                );
                Some(record)
            }
            Ok(Some(record)) => {
                debug!(
                    %app_id,
                    saved_app_id = %record.app_id,
                    "Ignoring saved state for a different game"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable state file");
                None
            }
        }
    }

    /// Saves `record`, replacing any existing record.
    ///
    /// The line is written to a temporary file first and renamed into place,
    /// so an interrupted write never leaves a truncated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save(&self, record: &SavedProgress) -> Result<()> {
        let tmp_path = self.record_path.with_extension("txt.tmp");
        let line = format!("{}\n", record.to_line());

        fs::write(&tmp_path, line).map_err(|e| StateError::WriteFile {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.record_path).map_err(|e| StateError::WriteFile {
            path: self.record_path.clone(),
            source: e,
        })?;

        info!(
            app_id = %record.app_id,
            target = %record.target,
            seconds = record.seconds_idled,
            "Saved idle state"
        );
        Ok(())
    }

    /// Removes the record. A missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be deleted.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.record_path) {
            Ok(()) => {
                debug!(path = %self.record_path.display(), "Cleared state file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::DeleteFile {
                path: self.record_path.clone(),
                source: e,
            }),
        }
    }
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".yasi")
}
