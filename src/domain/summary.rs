//! Update result summary types
//!
//! Provides structures for tracking update results at formula and overall levels.

use super::{Ecosystem, UpdateResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Update result for a single formula file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaUpdateResult {
    /// Path to the formula file
    pub path: PathBuf,
    /// Individual dependency update results
    pub results: Vec<UpdateResult>,
    /// Whether the file was (or in dry-run, would be) modified
    pub modified: bool,
}

impl FormulaUpdateResult {
    /// Creates a new FormulaUpdateResult
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            results: Vec::new(),
            modified: false,
        }
    }

    /// Adds an update result
    pub fn add_result(&mut self, result: UpdateResult) {
        if result.is_update() {
            self.modified = true;
        }
        self.results.push(result);
    }

    /// Returns the number of updates
    pub fn update_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_update()).count()
    }

    /// Returns the number of skips
    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skip()).count()
    }

    /// Returns all updates
    pub fn updates(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_update())
    }

    /// Returns all skips
    pub fn skips(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_skip())
    }
}

/// Overall summary of all update operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Results for each formula processed
    pub formulae: Vec<FormulaUpdateResult>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl UpdateSummary {
    /// Creates a new UpdateSummary
    pub fn new(dry_run: bool) -> Self {
        Self {
            formulae: Vec::new(),
            dry_run,
        }
    }

    /// Adds a formula result
    pub fn add_formula(&mut self, formula: FormulaUpdateResult) {
        self.formulae.push(formula);
    }

    /// Returns the total number of files processed
    pub fn files_processed(&self) -> usize {
        self.formulae.len()
    }

    /// Returns the total number of files modified
    pub fn files_modified(&self) -> usize {
        self.formulae.iter().filter(|m| m.modified).count()
    }

    /// Returns the total number of dependencies updated
    pub fn total_updates(&self) -> usize {
        self.formulae.iter().map(|m| m.update_count()).sum()
    }

    /// Returns the total number of dependencies skipped
    pub fn total_skips(&self) -> usize {
        self.formulae.iter().map(|m| m.skip_count()).sum()
    }

    /// Returns all updates across all formulae
    pub fn all_updates(&self) -> impl Iterator<Item = &UpdateResult> {
        self.formulae.iter().flat_map(|m| m.updates())
    }

    /// Returns updates whose checksum is still the previous release's
    pub fn stale_hashes(&self) -> impl Iterator<Item = &UpdateResult> {
        self.all_updates()
            .filter(|r| matches!(r, UpdateResult::Update { hash, .. } if hash.is_stale()))
    }

    /// Returns results whose reference belongs to `ecosystem`
    pub fn by_ecosystem(&self, ecosystem: Ecosystem) -> impl Iterator<Item = &UpdateResult> {
        self.formulae
            .iter()
            .flat_map(|m| m.results.iter())
            .filter(move |r| Ecosystem::classify(&r.dependency().path) == ecosystem)
    }
}

impl Default for UpdateSummary {
    fn default() -> Self {
        Self::new(false)
    }
}
