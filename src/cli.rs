//! CLI argument parsing module for brewup

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a timeout in whole seconds, optionally suffixed with `s`
fn parse_seconds(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let digits = s.strip_suffix('s').unwrap_or(s);
    if digits.is_empty() {
        return Err("empty timeout".to_string());
    }

    let secs: u64 = digits
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if secs == 0 {
        return Err("timeout must be at least one second".to_string());
    }
    Ok(secs)
}

/// Formula updater with checksum reconciliation
#[derive(Parser, Debug, Clone)]
#[command(
    name = "brewup",
    version,
    about = "Update formula versions and checksums from upstream releases"
)]
pub struct CliArgs {
    /// Directory searched recursively for *.rb formulae (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // General options
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Discovery
    /// Skip formulae whose path contains this text (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub ignore: Vec<String>,

    // Hashing
    /// Verify detached .asc signatures of downloaded artifacts with gpg
    #[arg(long, env = "INPUT_GPG")]
    pub gpg: bool,

    /// Time budget in seconds for checking each dependency
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<u64>,

    // Upstream
    /// Token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Base URL of the GitHub API
    #[arg(long)]
    pub github_api_url: Option<String>,

    // Output
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}
