//! Game session adapters.
//!
//! Steam counts a game as running while a process has initialized the Steam
//! API for its app id. The controller only needs three operations from that
//! mechanism, so it talks to a [`GameSession`] and never to the mechanism itself.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};
use yasi_types::AppId;

/// Name of the file the Steam API reads the app id from.
pub const MARKER_FILE: &str = "steam_appid.txt";

/// Errors that can occur while opening a game session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// `open` was called on a session that is already open.
    #[error("A session for app {0} is already open")]
    AlreadyOpen(AppId),

    /// Failed to write the app id marker file.
    #[error("Failed to write session marker '{path}': {source}")]
    Marker {
        /// The marker path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to start the session helper program.
    #[error("Failed to start session helper '{program}': {source}")]
    SpawnHelper {
        /// The helper program.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A running game as seen by Steam.
///
/// `open` is called once before any other method. `close` must be safe to
/// call any number of times, including after a failed or missing `open`.
pub trait GameSession: Send {
    /// Starts the session for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be started; nothing needs to be
    /// released in that case.
    fn open(&mut self, app_id: AppId, game_name: &str) -> Result<(), SessionError>;

    /// Called once per tick while idling.
    fn keep_alive(&mut self);

    /// Stops the session and releases everything `open` acquired.
    fn close(&mut self);
}

/// State of an open [`ProcessSession`].
#[derive(Debug)]
struct OpenSession {
    app_id: AppId,
    marker: PathBuf,
    helper: Option<Child>,
    helper_exit_reported: bool,
}

/// Session adapter backed by the `steam_appid.txt` marker and an optional helper process.
///
/// On open the marker file is written into the session directory and, if
/// configured, the helper program is spawned with the app id as its only
/// argument. The helper is expected to initialize the Steam API and pump its
/// callbacks until killed. Close kills the helper and removes the marker.
#[derive(Debug)]
pub struct ProcessSession {
    dir: PathBuf,
    helper: Option<PathBuf>,
    open: Option<OpenSession>,
}

impl ProcessSession {
    /// Creates a session adapter writing its marker into `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf, helper: Option<PathBuf>) -> Self {
        Self {
            dir,
            helper,
            open: None,
        }
    }

    /// Returns the path of the marker file.
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(MARKER_FILE)
    }

    /// Returns true while a session is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn spawn_helper(program: &Path, app_id: AppId) -> Result<Child, SessionError> {
        Command::new(program)
            .arg(app_id.to_string())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| SessionError::SpawnHelper {
                program: program.to_path_buf(),
                source: e,
            })
    }
}

impl GameSession for ProcessSession {
    fn open(&mut self, app_id: AppId, game_name: &str) -> Result<(), SessionError> {
        if let Some(open) = &self.open {
            return Err(SessionError::AlreadyOpen(open.app_id));
        }
        info!(%app_id, game = %game_name, "Starting game session");

        let marker = self.marker_path();
        remove_marker(&marker);
        fs::write(&marker, app_id.to_string()).map_err(|e| SessionError::Marker {
            path: marker.clone(),
            source: e,
        })?;
        debug!(path = %marker.display(), "Created session marker");

        let helper = match self.helper.as_deref().map(|p| Self::spawn_helper(p, app_id)) {
            Some(Ok(child)) => Some(child),
            Some(Err(e)) => {
                remove_marker(&marker);
                return Err(e);
            }
            None => None,
        };

        self.open = Some(OpenSession {
            app_id,
            marker,
            helper,
            helper_exit_reported: false,
        });
        info!(game = %game_name, "Steam should now show you as playing this game");
        Ok(())
    }

    fn keep_alive(&mut self) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        let Some(child) = open.helper.as_mut() else {
            return;
        };
        if open.helper_exit_reported {
            return;
        }
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                warn!(app_id = %open.app_id, %status, "Session helper exited, Steam may no longer see the game running");
                open.helper_exit_reported = true;
            }
            Err(e) => {
                warn!(app_id = %open.app_id, error = %e, "Could not check session helper");
                open.helper_exit_reported = true;
            }
        }
    }

    fn close(&mut self) {
        let Some(mut open) = self.open.take() else {
            return;
        };
        info!(app_id = %open.app_id, "Shutting down game session");

        if let Some(mut child) = open.helper.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "Session helper already stopped");
            }
            if let Err(e) = child.wait() {
                warn!(error = %e, "Failed to reap session helper");
            }
        }
        remove_marker(&open.marker);
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Removes the marker file, treating a missing file as success.
fn remove_marker(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed session marker"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove session marker"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_writes_marker_and_close_removes_it() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), None);

        session.open(AppId::new(440), "Team Fortress 2").unwrap();
        assert!(session.is_open());
        assert_eq!(fs::read_to_string(session.marker_path()).unwrap(), "440");

        session.keep_alive();
        session.close();
        assert!(!session.is_open());
        assert!(!session.marker_path().exists());

        session.close();
    }

    #[test]
    fn test_stale_marker_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), None);
        fs::write(session.marker_path(), "570").unwrap();

        session.open(AppId::new(440), "440").unwrap();
        assert_eq!(fs::read_to_string(session.marker_path()).unwrap(), "440");
    }

    #[test]
    fn test_double_open_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), None);

        session.open(AppId::new(440), "440").unwrap();
        assert!(matches!(
            session.open(AppId::new(570), "570"),
            Err(SessionError::AlreadyOpen(id)) if id == AppId::new(440)
        ));
    }

    #[test]
    fn test_missing_helper_fails_open_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let helper = temp_dir.path().join("no-such-helper");
        let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), Some(helper));

        assert!(matches!(
            session.open(AppId::new(440), "440"),
            Err(SessionError::SpawnHelper { .. })
        ));
        assert!(!session.is_open());
        assert!(!session.marker_path().exists());
    }

    #[test]
    fn test_drop_closes_session() {
        let temp_dir = TempDir::new().unwrap();
        let marker = {
            let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), None);
            session.open(AppId::new(440), "440").unwrap();
            session.marker_path()
        };
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_helper_is_killed_on_close() {
        let temp_dir = TempDir::new().unwrap();
        let helper = temp_dir.path().join("helper.sh");
        fs::write(&helper, "#!/bin/sh\nexec sleep 30\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&helper, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let mut session = ProcessSession::new(temp_dir.path().to_path_buf(), Some(helper));

        session.open(AppId::new(440), "440").unwrap();
        session.keep_alive();
        session.close();
        assert!(!session.is_open());
    }
}
