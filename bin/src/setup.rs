//! Startup wiring shared by the commands.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use yasi_lib::{
    ClientConfig, IdleConfig, IdleController, InventoryClient, NameResolver, ProcessSession,
    ProgressSource, StateStore,
};

use crate::Cli;

/// Name of the configuration file in the default config directory.
const CONFIG_FILE: &str = "config.json";

/// Returns the configuration file path from the CLI or the platform config directory.
fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(|| {
        ProjectDirs::from("", "", "yasi").map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dirs| dirs.config_dir().join(CONFIG_FILE),
        )
    })
}

/// Loads the configuration and applies the CLI interval override.
pub(crate) fn load_config(cli: &Cli) -> Result<IdleConfig> {
    let path = config_path(cli);
    debug!(path = %path.display(), "Loading configuration");

    let config = IdleConfig::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    match cli.interval {
        Some(seconds) => Ok(config.with_interval(seconds)?),
        None => Ok(config),
    }
}

/// Builds the controller for `config` with the real Steam clients.
pub(crate) fn build_controller(cli: &Cli, config: IdleConfig) -> Result<IdleController<ProcessSession>> {
    let client_config = ClientConfig::from_idle_config(&config);

    let source = if config.enable_inventory_checking {
        let client = InventoryClient::new(client_config.clone())
            .context("Failed to create inventory client")?;
        ProgressSource::Inventory(Arc::new(client))
    } else {
        warn!("Inventory checking is disabled, using timed idling mode");
        ProgressSource::Timed
    };
    let names = NameResolver::new(&client_config).context("Failed to create store client")?;

    let store = match &cli.state_dir {
        Some(dir) => StateStore::new(dir.clone()),
        None => StateStore::with_default_path(),
    }
    .context("Failed to initialize state store")?;

    let session_dir = match &cli.session_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };
    let session = ProcessSession::new(session_dir, config.session_helper.clone());

    Ok(IdleController::new(config, source, Arc::new(names), store, session))
}

/// Resolves when the user presses Ctrl+C.
///
/// If the signal handler cannot be installed the future never resolves.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
