//! Run configuration
//!
//! This module provides:
//! - `FileSettings`: the optional `.brewup.toml` in the target directory
//! - `Settings`: the effective configuration, CLI values taking precedence

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::source::{SourceConfig, GITHUB_API_URL, GOLANG_HISTORY_URL, GOLANG_INDEX_URL};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the target directory
pub const SETTINGS_FILENAME: &str = ".brewup.toml";

/// Default time budget for checking one dependency and for hashing its update
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(120);

/// Contents of `.brewup.toml`
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub gpg: Option<bool>,
    pub ignore: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub github_api_url: Option<String>,
    pub golang_index_url: Option<String>,
    pub golang_history_url: Option<String>,
}

impl FileSettings {
    /// Load settings from `dir`, falling back to defaults when the file is absent
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SETTINGS_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content, &path)
    }

    /// Parse settings file content
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

/// Effective configuration of a run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory searched for formulae
    pub root: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub json: bool,
    /// Verify detached signatures of downloaded artifacts
    pub gpg: bool,
    /// Path substrings excluded from discovery
    pub ignore: Vec<String>,
    /// Per-dependency time budget
    pub timeout: Duration,
    /// Upstream endpoints and credentials
    pub sources: SourceConfig,
}

impl Settings {
    /// Merge CLI arguments over file settings
    pub fn resolve(args: &CliArgs, file: FileSettings) -> Result<Self, ConfigError> {
        if args.quiet && args.verbose {
            return Err(ConfigError::ConflictingOptions {
                message: "--quiet and --verbose cannot be used together".to_string(),
            });
        }

        let mut ignore = file.ignore;
        ignore.extend(args.ignore.iter().cloned());

        let timeout = args
            .timeout
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CHECK_TIMEOUT);

        let sources = SourceConfig {
            github_api_url: args
                .github_api_url
                .clone()
                .or(file.github_api_url)
                .unwrap_or_else(|| GITHUB_API_URL.to_string()),
            github_token: args.github_token.clone().filter(|t| !t.is_empty()),
            golang_index_url: file
                .golang_index_url
                .unwrap_or_else(|| GOLANG_INDEX_URL.to_string()),
            golang_history_url: file
                .golang_history_url
                .unwrap_or_else(|| GOLANG_HISTORY_URL.to_string()),
        };

        Ok(Self {
            root: args.path.clone(),
            dry_run: args.dry_run,
            verbose: args.verbose,
            quiet: args.quiet,
            json: args.json,
            gpg: args.gpg || file.gpg.unwrap_or(false),
            ignore,
            timeout,
            sources,
        })
    }

    /// Load `.brewup.toml` from the target directory and merge the CLI over it
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = FileSettings::from_dir(&args.path)?;
        Self::resolve(args, file)
    }
}
