//! yasi CLI - Idle a Steam game until a trading card target is reached.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use yasi_lib::{AppId, IdleError, TargetSpec};

mod commands;
mod setup;

/// Exit code for configuration and startup failures.
const EXIT_FAILURE: u8 = 1;
/// Exit code when the game session could not be started.
const EXIT_SESSION: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "yasi")]
#[command(about = "Yet Another Steam Idler - idle one game until a card target is reached", long_about = None)]
#[command(version)]
struct Cli {
    /// App id of the game to idle
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    app_id: u32,

    /// Card target: `tX` for a total of X cards, `rX` for X more cards
    #[arg(short, long, required_unless_present = "fast")]
    card_target: Option<TargetSpec>,

    /// Seconds between card checks (defaults to the configured interval)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Fast check mode: run the game for 5 seconds and exit
    #[arg(short, long)]
    fast: bool,

    /// Configuration file
    #[arg(long, env = "YASI_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the resumable progress record
    #[arg(long, env = "YASI_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Directory the session marker file is written to (defaults to the current directory)
    #[arg(long, env = "YASI_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    const fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let app_id = AppId::new(cli.app_id);
    let result = match cli.card_target {
        _ if cli.fast => commands::fast_check::fast_check(&cli, app_id).await,
        Some(target) => commands::idle::idle(&cli, app_id, target).await,
        None => Err(anyhow::anyhow!("A card target is required unless --fast is given")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            if e.downcast_ref::<IdleError>().is_some_and(IdleError::is_session) {
                ExitCode::from(EXIT_SESSION)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}
