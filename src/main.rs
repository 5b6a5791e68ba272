mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use calsync_core::CalSyncError;
use calsync_core::report::Reporter;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "calsync", version)]
#[command(about = "Mirror the next 30 days of one calendar into another")]
pub struct Cli {
    /// Calendar to copy from, as "account→calendar"
    pub source: String,

    /// Calendar to copy into, as "account→calendar"
    pub target: String,

    /// Further positional arguments are accepted and ignored
    #[arg(hide = true)]
    pub extra: Vec<String>,

    /// Print what would change without touching the target calendar
    #[arg(long)]
    pub dry_run: bool,

    /// Root of the calendar directory (overrides calendar_dir from config)
    #[arg(long, value_name = "DIR")]
    pub calendar_dir: Option<PathBuf>,

    /// Number of days to mirror, starting today (overrides window_days)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CALSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let mut reporter = Reporter::stdio();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::debug!(error = %e, "argument parsing failed");
            if e.kind() != ErrorKind::MissingRequiredArgument {
                let _ = e.print();
            }
            reporter.error(CalSyncError::InvalidArguments);
            return ExitCode::FAILURE;
        }
    };

    match commands::sync::run(cli, &mut reporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CalSyncError>() {
                Some(fatal) => reporter.error(fatal),
                None => reporter.error(format!("{e:#}")),
            }
            ExitCode::FAILURE
        }
    }
}
