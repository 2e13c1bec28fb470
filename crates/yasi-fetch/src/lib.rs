//! Steam inventory and store API fetching for the yasi idler.
//!
//! This crate turns Steam's web APIs into typed readings:
//!
//! - [`url`] - Inventory and store URL construction
//! - [`InventoryClient`] - HTTP client for community inventory pages
//! - [`count_cards`] - Paginated trading card counting over any [`PageFetcher`]
//! - [`NameResolver`] - Cached, best-effort game name lookup
//! - [`wire`] - Typed response structs decoded once at the HTTP boundary

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod inventory;
mod names;
mod source;
pub mod url;
pub mod wire;

pub use client::{ClientConfig, InventoryClient};
pub use error::FetchError;
pub use inventory::count_cards;
pub use names::NameResolver;
pub use source::{CardSource, NameSource, PageFetcher, PageRequest};
