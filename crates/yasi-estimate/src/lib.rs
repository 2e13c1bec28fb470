//! Timed card drop estimation for the yasi idler.
//!
//! When inventory checking is disabled there is no way to observe a drop, so
//! drops are assumed to happen at a fixed rate of idling time:
//!
//! - [`DropEstimator`] - Converts elapsed idle time into assumed drops, idle
//!   budgets, and the resumable offset into the next drop

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod estimator;

pub use estimator::DropEstimator;
