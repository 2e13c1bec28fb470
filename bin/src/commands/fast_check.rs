//! Fast check: run the game briefly and exit.

use anyhow::Result;
use std::time::Duration;
use yasi_lib::AppId;

use crate::Cli;
use crate::setup::{build_controller, load_config, shutdown_signal};

/// How long the game runs in fast check mode.
const FAST_CHECK_DURATION: Duration = Duration::from_secs(5);

/// Opens the game session for a few seconds, then closes it.
pub(crate) async fn fast_check(cli: &Cli, app_id: AppId) -> Result<()> {
    let config = load_config(cli)?;
    let mut controller = build_controller(cli, config)?;

    controller
        .fast_check(app_id, FAST_CHECK_DURATION, shutdown_signal())
        .await?;
    Ok(())
}
