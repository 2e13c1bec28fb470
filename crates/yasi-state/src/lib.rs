//! Resumable idle state persistence for the yasi idler.
//!
//! Timed idling (no inventory access) cannot observe drops, so progress toward
//! the next drop is saved when a session stops early and restored on the next
//! run for the same game:
//!
//! - [`SavedProgress`] - The single persisted record
//! - [`StateStore`] - Loads, saves and clears the record on disk

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod record;
mod state;

pub use record::{RecordFormatError, SavedProgress};
pub use state::{Result, StateError, StateStore};
