//! Idle command implementation.
//!
//! This module runs one game until its card target is reached, the idle
//! budget runs out, or the user interrupts it.

use anyhow::Result;
use tracing::{info, warn};
use yasi_lib::{AppId, IdleOutcome, IdleReport, TargetSpec};

use crate::Cli;
use crate::setup::{build_controller, load_config, shutdown_signal};

/// Idles `app_id` toward `target`.
pub(crate) async fn idle(cli: &Cli, app_id: AppId, target: TargetSpec) -> Result<()> {
    let config = load_config(cli)?;
    info!(%app_id, "--- YASI: Yet Another Steam Idler ---");
    if config.enable_inventory_checking {
        info!(seconds = config.default_monitoring_interval_seconds, "Monitoring interval");
    }

    let mut controller = build_controller(cli, config)?;
    let plan = controller.prepare(app_id, target).await?;
    let report = controller.run(&plan, shutdown_signal()).await?;

    summarize(&report);
    Ok(())
}

fn summarize(report: &IdleReport) {
    if !report.entered_idling {
        info!(count = report.final_count, "No idling needed");
        return;
    }

    let minutes = report.idled.as_secs_f64() / 60.0;
    let started = report.started_at.format("%Y-%m-%d %H:%M:%S");
    match report.outcome {
        IdleOutcome::Completed => info!(
            cards = report.cards_this_session,
            %started,
            "Target reached after {minutes:.1} minutes"
        ),
        IdleOutcome::BudgetExhausted => warn!(
            cards = report.cards_this_session,
            %started,
            "Stopped after {minutes:.1} minutes without reaching the target"
        ),
        IdleOutcome::Interrupted => info!(
            cards = report.cards_this_session,
            %started,
            "Interrupted after {minutes:.1} minutes"
        ),
    }
}
