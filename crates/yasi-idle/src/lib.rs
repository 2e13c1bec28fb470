//! Idle session control for the yasi idler.
//!
//! - [`IdleController`] - Prepares a run and drives the idle loop to an [`IdleOutcome`]
//! - [`GameSession`] - The open/keep-alive/close seam to whatever makes Steam see the game running
//! - [`ProcessSession`] - Session adapter backed by a marker file and an optional helper process

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
mod error;
mod session;

pub use controller::{IdleController, IdleOutcome, IdlePlan, IdleReport, ProgressSource};
pub use error::{IdleError, Result};
pub use session::{GameSession, MARKER_FILE, ProcessSession, SessionError};
