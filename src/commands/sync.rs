use std::io::Write;

use anyhow::Result;
use calsync_core::Mode;
use calsync_core::config::CalsyncConfig;
use calsync_core::report::Reporter;
use calsync_core::store::LocalStore;
use calsync_core::sync::{SyncOptions, run_sync};

use crate::Cli;

pub async fn run<O: Write, E: Write>(cli: Cli, reporter: &mut Reporter<O, E>) -> Result<()> {
    if !cli.extra.is_empty() {
        tracing::debug!(ignored = ?cli.extra, "ignoring extra arguments");
    }
    let mut config = match &cli.config {
        Some(path) => CalsyncConfig::load_from(path)?,
        None => CalsyncConfig::load()?,
    };
    if let Some(dir) = cli.calendar_dir {
        config.calendar_dir = dir;
    }
    if let Some(days) = cli.days {
        config.window_days = days;
    }

    let store = LocalStore::new(config.data_path());
    tracing::debug!(root = %store.root().display(), "using local calendar store");

    let options = SyncOptions {
        mode: if cli.dry_run { Mode::DryRun } else { Mode::Live },
        window_days: config.window_days,
        auth_timeout: config.auth_timeout(),
        window: None,
    };

    let report = run_sync(&store, &cli.source, &cli.target, &options, reporter).await?;

    tracing::info!(
        created = report.created(),
        deleted = report.deleted(),
        planned = report.planned(),
        failed = report.failed(),
        "sync finished"
    );

    Ok(())
}
