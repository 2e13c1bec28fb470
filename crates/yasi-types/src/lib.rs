//! Core types for the yasi Steam trading card idler.
//!
//! This crate provides the data structures shared across the workspace:
//!
//! - [`AppId`] - Steam application identifier, the subject of every run
//! - [`TargetSpec`] - Parsed card target expression (`t5`, `r2`)
//! - [`EffectiveTarget`] - Absolute card count a session idles toward
//! - [`IdleConfig`] - Immutable static configuration

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod error;
mod target;

pub use app::AppId;
pub use config::{IdleConfig, TimeoutConfig};
pub use error::{ConfigError, TargetSpecError};
pub use target::{EffectiveTarget, TargetMode, TargetSpec};
