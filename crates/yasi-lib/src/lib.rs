//! Idle Steam games until a trading card target is reached.
//!
//! This is a facade crate that re-exports functionality from the yasi
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use yasi_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IdleConfig::load(std::path::Path::new("config.json"))?;
//!     let client = ClientConfig::from_idle_config(&config);
//!     let source = ProgressSource::Inventory(Arc::new(InventoryClient::new(client.clone())?));
//!     let names = Arc::new(NameResolver::new(&client)?);
//!     let session = ProcessSession::new(std::env::current_dir()?, None);
//!
//!     let mut controller =
//!         IdleController::new(config, source, names, StateStore::with_default_path()?, session);
//!     let plan = controller.prepare(AppId::new(440), "r2".parse()?).await?;
//!     let report = controller.run(&plan, async { tokio::signal::ctrl_c().await.ok(); }).await?;
//!     println!("{}", report.outcome.as_str());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yasi/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use yasi_types::*;

// Re-export estimation and persistence
pub use yasi_estimate::DropEstimator;
pub use yasi_state::{RecordFormatError, SavedProgress, StateError, StateStore};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use yasi_fetch::{
    CardSource, ClientConfig, FetchError, InventoryClient, NameResolver, NameSource, PageFetcher,
    PageRequest, count_cards,
};

// Re-export the idle loop
#[cfg(feature = "idle")]
pub use yasi_idle::{
    GameSession, IdleController, IdleError, IdleOutcome, IdlePlan, IdleReport, MARKER_FILE,
    ProcessSession, ProgressSource, SessionError,
};

/// Prelude module for convenient imports.
///
/// ```
/// use yasi_lib::prelude::*;
/// ```
pub mod prelude {
    pub use yasi_types::{AppId, ConfigError, EffectiveTarget, IdleConfig, TargetMode, TargetSpec};

    pub use yasi_estimate::DropEstimator;
    pub use yasi_state::{SavedProgress, StateStore};

    #[cfg(feature = "fetch")]
    pub use yasi_fetch::{CardSource, ClientConfig, InventoryClient, NameResolver, NameSource};

    #[cfg(feature = "idle")]
    pub use yasi_idle::{
        GameSession, IdleController, IdleError, IdleOutcome, IdleReport, ProcessSession,
        ProgressSource,
    };
}
