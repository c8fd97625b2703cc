//! The default `metaclean <root> [interval]` command.
//!
//! Without an interval the tree is cleaned once. With one, it is cleaned
//! again every `interval` seconds until the root disappears or the user
//! presses Ctrl-C.

mod pass;
mod report;

use clap::Args;
use metaclean_core::{BatchProcessor, Config};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use pass::run_pass;

/// Arguments for cleaning a directory tree.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory tree to clean (`~` is expanded)
    pub root: PathBuf,

    /// Re-run every N seconds until the directory disappears
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of files processed concurrently (overrides config)
    #[arg(short = 'j', long)]
    pub parallel: Option<usize>,
}

/// Run the command with the loaded configuration.
pub async fn execute(args: CleanArgs, mut config: Config) -> anyhow::Result<()> {
    let root = expand_root(&args.root);
    if !root.is_dir() {
        anyhow::bail!(
            "Root directory not found: {:?}\n\n  \
             Hint: pass an existing directory, e.g. `metaclean ~/Pictures`",
            root
        );
    }

    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.processing.parallel_workers = parallel;
    }

    if args.dry_run {
        tracing::info!("Dry run: images, locations and the index are left untouched");
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let processor = BatchProcessor::new(&config);
    let options = PassOptions {
        root: &root,
        config: &config,
        dry_run: args.dry_run,
    };

    match args.interval {
        None => {
            run_pass(&processor, &options, &cancel).await?;
        }
        Some(seconds) => watch(&processor, &options, &cancel, Duration::from_secs(seconds)).await,
    }

    Ok(())
}

/// What a single pass needs besides the processor.
pub(crate) struct PassOptions<'a> {
    pub root: &'a Path,
    pub config: &'a Config,
    pub dry_run: bool,
}

/// Clean repeatedly until the root goes away or the run is cancelled.
///
/// A failed pass is logged and retried on the next tick.
async fn watch(
    processor: &BatchProcessor,
    options: &PassOptions<'_>,
    cancel: &CancellationToken,
    interval: Duration,
) {
    tracing::info!(
        "Watching {:?} every {}s (Ctrl-C to stop)",
        options.root,
        interval.as_secs()
    );

    loop {
        if !options.root.is_dir() {
            tracing::info!("{:?} no longer exists, stopping", options.root);
            break;
        }

        if let Err(e) = run_pass(processor, options, cancel).await {
            tracing::error!("Pass failed: {e:#}");
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Cancel `token` on the first Ctrl-C.
///
/// Files already being processed finish; nothing new is started.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing files in progress");
            token.cancel();
        }
    });
}

fn expand_root(root: &Path) -> PathBuf {
    let raw = root.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
