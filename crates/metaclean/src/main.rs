//! metaclean CLI - strip image metadata in place, incrementally.
//!
//! Walks a directory tree, removes embedded metadata (EXIF, XMP, ...) from
//! every image, saves GPS positions to sidecar files, and records what it
//! cleaned in `<root>/.imc` so later runs skip unchanged files.
//!
//! # Usage
//!
//! ```bash
//! # Clean a directory once
//! metaclean ./photos
//!
//! # Keep cleaning it every 30 seconds
//! metaclean ./photos 30
//!
//! # See what would change without writing
//! metaclean ./photos --dry-run
//! ```

use clap::Parser;
use std::path::PathBuf;

mod cli;
mod logging;

/// metaclean - strip image metadata in place, keeping GPS locations aside.
#[derive(Parser, Debug)]
#[command(name = "metaclean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    clean: cli::clean::CleanArgs,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "METACLEAN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

/// Exit code for malformed command lines.
const USAGE_ERROR: i32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout
            let code = if e.use_stderr() { USAGE_ERROR } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config {
        Some(path) => metaclean_core::Config::load_from(path),
        None => metaclean_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Default location: {}",
                metaclean_core::Config::default_path().display()
            );
            metaclean_core::Config::default()
        }
    };
    logging::init_from_config(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("metaclean v{}", metaclean_core::VERSION);

    // Returning Err also exits with status 1
    cli::clean::execute(cli.clean, config).await
}
