//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of update results
//! - Structured formula-by-formula update/skip information

use crate::domain::{Ecosystem, FormulaUpdateResult, HashStatus, SkipReason, UpdateResult, UpdateSummary};
use crate::orchestrator::OrchestratorResult;
use crate::output::{formula_name, OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    dry_run: bool,
    summary: JsonSummary,
    formulae: Vec<JsonFormula>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    updates: usize,
    skips: usize,
    /// Updates whose checksum could not be reconciled
    stale_hashes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    by_source: Vec<JsonSourceSummary>,
}

/// JSON representation of per-source summary
#[derive(Serialize)]
struct JsonSourceSummary {
    source: String,
    updates: usize,
    skips: usize,
}

/// JSON representation of a formula result
#[derive(Serialize)]
struct JsonFormula {
    name: String,
    path: String,
    modified: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    updates: Vec<JsonUpdate>,
    /// Only in verbose mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skips: Vec<JsonSkip>,
}

/// JSON representation of an update
#[derive(Serialize)]
struct JsonUpdate {
    url: String,
    from: String,
    to: String,
    hash: HashStatus,
}

/// JSON representation of a skip
#[derive(Serialize)]
struct JsonSkip {
    url: String,
    version: String,
    reason: String,
}

impl JsonFormatter {
    /// Convert skip reason to string
    fn skip_reason_to_string(reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "already_latest".to_string(),
            SkipReason::UnparseableVersion => "unparseable_version".to_string(),
            SkipReason::CheckFailed(msg) => format!("check_failed: {}", msg),
        }
    }

    /// Convert formula result to JSON representation
    fn formula_to_json(&self, formula: &FormulaUpdateResult) -> JsonFormula {
        let updates: Vec<JsonUpdate> = formula
            .updates()
            .filter_map(|result| match result {
                UpdateResult::Update { update, hash, .. } => Some(JsonUpdate {
                    url: update.path.clone(),
                    from: update.previous.clone(),
                    to: update.next.clone(),
                    hash: hash.clone(),
                }),
                UpdateResult::Skip { .. } => None,
            })
            .collect();

        let skips: Vec<JsonSkip> = if self.verbosity == Verbosity::Verbose {
            formula
                .skips()
                .filter_map(|result| match result {
                    UpdateResult::Skip { dependency, reason } => Some(JsonSkip {
                        url: dependency.path.clone(),
                        version: dependency.version.clone(),
                        reason: Self::skip_reason_to_string(reason),
                    }),
                    UpdateResult::Update { .. } => None,
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonFormula {
            name: formula_name(&formula.path),
            path: formula.path.display().to_string(),
            modified: formula.modified,
            updates,
            skips,
        }
    }

    fn summary_to_json(&self, summary: &UpdateSummary) -> JsonSummary {
        let by_source = if self.verbosity == Verbosity::Verbose {
            Ecosystem::all()
                .iter()
                .filter_map(|ecosystem| {
                    let results: Vec<_> = summary.by_ecosystem(*ecosystem).collect();
                    if results.is_empty() {
                        return None;
                    }
                    Some(JsonSourceSummary {
                        source: ecosystem.display_name().to_string(),
                        updates: results.iter().filter(|r| r.is_update()).count(),
                        skips: results.iter().filter(|r| r.is_skip()).count(),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        JsonSummary {
            files: summary.files_processed(),
            updates: summary.total_updates(),
            skips: summary.total_skips(),
            stale_hashes: summary.stale_hashes().count(),
            by_source,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: result.summary.dry_run,
            summary: self.summary_to_json(&result.summary),
            formulae: result
                .summary
                .formulae
                .iter()
                .filter(|f| !f.results.is_empty())
                .map(|f| self.formula_to_json(f))
                .collect(),
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn format_summary(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.summary_to_json(summary)).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn format_formula(&self, formula: &FormulaUpdateResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.formula_to_json(formula)).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }
}
