//! brewup - Formula updater CLI tool
//!
//! Finds the newest upstream release of every `*.rb` formula below a
//! directory, rewrites its version and reconciles its checksum.

use brewup::cli::CliArgs;
use brewup::config::Settings;
use brewup::error::{AppError, FormulaError};
use brewup::orchestrator::Orchestrator;
use brewup::output::{create_formatter, OutputConfig};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code when the run finished but some formulae failed
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` takes precedence
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "brewup=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(&args)?;

    if settings.verbose {
        eprintln!("brewup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", settings.root.display());
        if settings.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    if !settings.root.is_dir() {
        return Err(AppError::from(FormulaError::directory_not_found(settings.root.clone())).into());
    }

    let output_config =
        OutputConfig::from_cli(settings.json, settings.verbose, settings.quiet, settings.dry_run);

    let orchestrator = Orchestrator::new(settings)?;
    let result = orchestrator.run().await;

    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_errors() {
        Ok(ExitCode::from(EXIT_PARTIAL))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
