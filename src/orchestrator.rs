//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: discover → parse → check → hash → write
//! - Per-dependency time budgets for version checks and hash resolution
//! - Dry-run mode support
//! - Error handling with partial continuation

use crate::config::Settings;
use crate::domain::{
    Dependency, FormulaUpdateResult, HashStatus, SkipReason, Update, UpdateResult, UpdateSummary,
};
use crate::error::{ConfigError, HashError};
use crate::formula::{
    apply_update, discover_formulae, parse_checksums, parse_dependency, read_formula,
    FormulaWriter,
};
use crate::hash::{GpgVerifier, HashResolver};
use crate::http::HttpClient;
use crate::progress::Progress;
use crate::resolver::UpdateResolver;
use crate::version;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    /// Effective run configuration
    settings: Settings,
    /// Finds the next version of each dependency
    resolver: UpdateResolver,
    /// Reconciles the checksum of each update
    hasher: HashResolver,
}

/// Result of running the orchestrator
pub struct OrchestratorResult {
    /// Update summary with all results
    pub summary: UpdateSummary,
    /// Errors encountered during processing
    pub errors: Vec<OrchestratorError>,
}

impl OrchestratorResult {
    /// Returns true if any formula or dependency failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Errors that can occur during orchestration
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Failed to discover formulae
    #[error("formula discovery failed: {0}")]
    Discovery(String),

    /// Failed to read a formula
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Failed to check a dependency for updates
    #[error("failed to check {path}: {message}")]
    Check { path: String, message: String },

    /// Failed to reconcile the checksum of an update
    #[error("failed to update checksum for {path}: {message}")]
    Hash { path: String, message: String },

    /// Failed to write a formula
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl Orchestrator {
    /// Create a new orchestrator for the given settings
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let client = HttpClient::new().map_err(|e| ConfigError::HttpClient {
            message: e.to_string(),
        })?;
        Ok(Self::with_client(settings, client))
    }

    /// Create an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(settings: Settings, client: HttpClient) -> Self {
        let resolver = UpdateResolver::new(client.clone(), settings.sources.clone());
        let mut hasher = HashResolver::new(client, &settings.sources);
        if settings.gpg {
            hasher = hasher.with_verifier(Arc::new(GpgVerifier::new()));
        }
        Self {
            settings,
            resolver,
            hasher,
        }
    }

    /// Run the update workflow
    pub async fn run(&self) -> OrchestratorResult {
        self.run_with_progress(!self.settings.quiet && !self.settings.json)
            .await
    }

    /// Run the update workflow with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> OrchestratorResult {
        let mut progress = Progress::new(show_progress);
        let mut summary = UpdateSummary::new(self.settings.dry_run);
        let mut errors = Vec::new();

        // Step 1: Discover formulae
        progress.spinner("Discovering formulae...");
        let formulae = match discover_formulae(&self.settings.root, &self.settings.ignore) {
            Ok(found) => found,
            Err(e) => {
                progress.finish_and_clear();
                errors.push(OrchestratorError::Discovery(e.to_string()));
                return OrchestratorResult { summary, errors };
            }
        };
        progress.finish_and_clear();
        debug!(count = formulae.len(), root = %self.settings.root.display(), "discovered formulae");

        // Step 2: Check, hash and rewrite each formula
        progress.start(formulae.len() as u64, "Checking formulae");
        let writer = FormulaWriter::new(self.settings.dry_run);
        for path in &formulae {
            progress.set_message(&format!("Checking {}", self.display_path(path)));
            if let Some(result) = self.process_formula(path, &writer, &mut errors).await {
                summary.add_formula(result);
            }
            progress.inc();
        }
        progress.finish_and_clear();

        OrchestratorResult { summary, errors }
    }

    /// Processes one formula, returning None when it could not be read
    async fn process_formula(
        &self,
        path: &Path,
        writer: &FormulaWriter,
        errors: &mut Vec<OrchestratorError>,
    ) -> Option<FormulaUpdateResult> {
        let content = match read_formula(path) {
            Ok(content) => content,
            Err(e) => {
                errors.push(OrchestratorError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return None;
            }
        };

        let mut result = FormulaUpdateResult::new(path);
        let Some(dependency) = parse_dependency(&content) else {
            debug!(path = %path.display(), "no versioned url found");
            return Some(result);
        };

        let update = match self.check(&dependency, errors).await {
            Ok(update) => update,
            Err(skip) => {
                result.add_result(skip);
                return Some(result);
            }
        };

        let hash = match parse_checksums(&content).as_slice() {
            [previous] => self.reconcile(&update, previous, errors).await,
            _ => HashStatus::NotApplicable,
        };

        let checksum = match &hash {
            HashStatus::Updated { previous, next } => Some((previous.as_str(), next.as_str())),
            _ => None,
        };
        let updated = apply_update(&content, &update, checksum);

        if let Err(e) = writer.write(path, &content, &updated) {
            errors.push(OrchestratorError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            return Some(result);
        }

        result.add_result(UpdateResult::update(dependency, update, hash));
        Some(result)
    }

    /// Finds the update of a dependency, or the reason it is skipped
    async fn check(
        &self,
        dependency: &Dependency,
        errors: &mut Vec<OrchestratorError>,
    ) -> Result<Update, UpdateResult> {
        let message = match timeout(self.settings.timeout, self.resolver.resolve(dependency)).await
        {
            Ok(Ok(Some(update))) => return Ok(update),
            Ok(Ok(None)) => {
                let reason = if version::normalize(&dependency.version).is_none() {
                    SkipReason::UnparseableVersion
                } else {
                    SkipReason::AlreadyLatest
                };
                return Err(UpdateResult::skip(dependency.clone(), reason));
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "version check timed out after {}s",
                self.settings.timeout.as_secs()
            ),
        };

        warn!(path = %dependency.path, error = %message, "error checking for updates");
        errors.push(OrchestratorError::Check {
            path: dependency.path.clone(),
            message: message.clone(),
        });
        Err(UpdateResult::skip_check_failed(dependency.clone(), message))
    }

    /// Resolves the checksum matching `previous` for the new version
    async fn reconcile(
        &self,
        update: &Update,
        previous: &str,
        errors: &mut Vec<OrchestratorError>,
    ) -> HashStatus {
        let outcome = match timeout(self.settings.timeout, self.hasher.resolve(update, previous)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(HashError::Timeout {
                secs: self.settings.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(Some(next)) => HashStatus::Updated {
                previous: previous.to_string(),
                next,
            },
            Ok(None) => {
                warn!(path = %update.path, next = %update.next, "no updated hash found, leaving it unchanged");
                HashStatus::NotFound {
                    previous: previous.to_string(),
                }
            }
            Err(e) => {
                warn!(path = %update.path, error = %e, "hash update failed");
                errors.push(OrchestratorError::Hash {
                    path: update.path.clone(),
                    message: e.to_string(),
                });
                HashStatus::Failed {
                    previous: previous.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Formula path relative to the root, for progress messages
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.settings.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
