//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Human-readable update result display with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Checksum reconciliation status per update
//! - Skipped formula display with reasons
//! - Summary with detailed breakdown

use crate::domain::{Ecosystem, FormulaUpdateResult, HashStatus, SkipReason, UpdateResult, UpdateSummary};
use crate::orchestrator::OrchestratorResult;
use crate::output::{formula_name, OutputFormatter, Verbosity};
use crate::version;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        match (version::normalize(old), version::normalize(new)) {
            (Some(old), Some(new)) => {
                let (old, new) = (old.as_semver(), new.as_semver());
                if new.major != old.major {
                    VersionChangeType::Major
                } else if new.minor != old.minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        match (self.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    /// Format a skip reason for display
    fn format_skip_reason(&self, reason: &SkipReason) -> String {
        match reason {
            SkipReason::AlreadyLatest => "latest".to_string(),
            SkipReason::UnparseableVersion => "unparseable version".to_string(),
            SkipReason::CheckFailed(msg) => format!("check failed: {}", msg),
        }
    }

    /// Short checksum note appended to an update line
    fn format_hash_status(&self, hash: &HashStatus) -> String {
        let (plain, colored) = match hash {
            HashStatus::Updated { .. } => ("checksum updated", "checksum updated".green()),
            HashStatus::NotApplicable => return String::new(),
            HashStatus::NotFound { .. } => ("checksum unchanged", "checksum unchanged".yellow()),
            HashStatus::Failed { .. } => ("checksum failed", "checksum failed".red()),
        };
        if self.color {
            format!(" {}", colored)
        } else {
            format!(" {}", plain)
        }
    }

    /// Format a single update line
    fn format_update_line(
        &self,
        old_version: &str,
        new_version: &str,
        hash: &HashStatus,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let change_type = VersionChangeType::from_versions(old_version, new_version);
        let hash_note = self.format_hash_status(hash);

        if self.color {
            writeln!(
                writer,
                "  {} {} {} [{}]{}",
                old_version.dimmed(),
                "→".dimmed(),
                new_version.bright_white().bold(),
                change_type.colored_label(),
                hash_note
            )
        } else {
            writeln!(
                writer,
                "  {} -> {} [{}]{}",
                old_version,
                new_version,
                change_type.label(),
                hash_note
            )
        }
    }

    /// Format a single skip line
    fn format_skip_line(&self, version: &str, reason: &SkipReason, writer: &mut dyn Write) -> std::io::Result<()> {
        let reason_str = self.format_skip_reason(reason);
        if self.color {
            writeln!(writer, "  {} {}", version.dimmed(), format!("({})", reason_str).dimmed())
        } else {
            writeln!(writer, "  {} ({})", version, reason_str)
        }
    }

    /// Format a formula with its update and skips
    fn format_formula_block(&self, formula: &FormulaUpdateResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let updates: Vec<_> = formula.updates().collect();
        let skips: Vec<_> = formula.skips().collect();

        // Only failed checks are worth showing outside verbose mode
        let shown_skips: Vec<_> = skips
            .into_iter()
            .filter(|r| {
                self.verbosity == Verbosity::Verbose
                    || matches!(
                        r,
                        UpdateResult::Skip {
                            reason: SkipReason::CheckFailed(_),
                            ..
                        }
                    )
            })
            .collect();

        if updates.is_empty() && shown_skips.is_empty() {
            return Ok(());
        }

        let name = formula_name(&formula.path);
        let path_display = formula.path.display().to_string();
        if self.color {
            writeln!(
                writer,
                "{}{} {}",
                self.dry_run_prefix(),
                name.bold(),
                format!("({})", path_display).dimmed()
            )?;
        } else {
            writeln!(writer, "{}{} ({})", self.dry_run_prefix(), name, path_display)?;
        }

        for result in updates {
            if let UpdateResult::Update { update, hash, .. } = result {
                self.format_update_line(&update.previous, &update.next, hash, writer)?;
            }
        }

        for result in shown_skips {
            if let UpdateResult::Skip { dependency, reason } = result {
                self.format_skip_line(&dependency.version, reason, writer)?;
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Count updates by change type
    fn count_by_change_type(&self, summary: &UpdateSummary) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for result in summary.all_updates() {
            if let UpdateResult::Update { update, .. } = result {
                match VersionChangeType::from_versions(&update.previous, &update.next) {
                    VersionChangeType::Major => counts.0 += 1,
                    VersionChangeType::Minor => counts.1 += 1,
                    VersionChangeType::Patch => counts.2 += 1,
                    VersionChangeType::Unknown => counts.3 += 1,
                }
            }
        }
        counts
    }

    /// Count skips by reason, most frequent first
    fn count_by_skip_reason(&self, summary: &UpdateSummary) -> Vec<(&'static str, usize)> {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for formula in &summary.formulae {
            for result in formula.skips() {
                if let UpdateResult::Skip { reason, .. } = result {
                    let key = match reason {
                        SkipReason::AlreadyLatest => "latest",
                        SkipReason::UnparseableVersion => "unparseable",
                        SkipReason::CheckFailed(_) => "failed",
                    };
                    *counts.entry(key).or_insert(0) += 1;
                }
            }
        }

        let mut result: Vec<_> = counts.into_iter().collect();
        result.sort_by(|a, b| b.1.cmp(&a.1));
        result
    }

    fn format_change_breakdown(&self, summary: &UpdateSummary) -> String {
        let (major, minor, patch, unknown) = self.count_by_change_type(summary);
        let mut parts = Vec::new();
        for (count, label) in [(major, "major"), (minor, "minor"), (patch, "patch"), (unknown, "other")] {
            if count == 0 {
                continue;
            }
            let count = if self.color {
                match label {
                    "major" => count.to_string().red().to_string(),
                    "minor" => count.to_string().yellow().to_string(),
                    "patch" => count.to_string().green().to_string(),
                    _ => count.to_string().dimmed().to_string(),
                }
            } else {
                count.to_string()
            };
            parts.push(format!("{} {}", count, label));
        }
        parts.join(", ")
    }

    fn format_errors(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.errors.is_empty() {
            return Ok(());
        }
        if self.color {
            writeln!(writer, "{}:", "Errors".red().bold())?;
        } else {
            writeln!(writer, "Errors:")?;
        }
        for error in &result.errors {
            if self.color {
                writeln!(writer, "  {} {}", "✗".red(), error)?;
            } else {
                writeln!(writer, "  - {}", error)?;
            }
        }
        writeln!(writer)
    }

    fn format_ecosystem_breakdown(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer)?;
        if self.color {
            writeln!(writer, "{}:", "By source".dimmed())?;
        } else {
            writeln!(writer, "By source:")?;
        }
        for ecosystem in Ecosystem::all() {
            let results: Vec<_> = summary.by_ecosystem(*ecosystem).collect();
            if results.is_empty() {
                continue;
            }
            let updated = results.iter().filter(|r| r.is_update()).count();
            let skipped = results.iter().filter(|r| r.is_skip()).count();
            if self.color {
                writeln!(
                    writer,
                    "  {}: {} updated, {} skipped",
                    ecosystem.display_name().cyan(),
                    updated.to_string().green(),
                    skipped.to_string().dimmed()
                )?;
            } else {
                writeln!(
                    writer,
                    "  {}: {} updated, {} skipped",
                    ecosystem.display_name(),
                    updated,
                    skipped
                )?;
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&result.summary, writer);
        }

        for formula in &result.summary.formulae {
            self.format_formula_block(formula, writer)?;
        }
        self.format_errors(result, writer)?;
        self.format_summary(&result.summary, writer)
    }

    fn format_summary(&self, summary: &UpdateSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = summary.total_updates();
        let skips = summary.total_skips();
        let stale = summary.stale_hashes().count();

        if self.verbosity == Verbosity::Quiet {
            return match (updates > 0, self.color) {
                (true, true) => writeln!(writer, "{}{} updated", prefix, updates.to_string().green()),
                (true, false) => writeln!(writer, "{}{} updated", prefix, updates),
                (false, true) => writeln!(writer, "{}{}", prefix, "No updates".dimmed()),
                (false, false) => writeln!(writer, "{}No updates", prefix),
            };
        }

        if self.color {
            writeln!(writer, "{}{}:", prefix, "Summary".bold())?;
        } else {
            writeln!(writer, "{}Summary:", prefix)?;
        }
        writeln!(writer, "  {} formula file(s) checked", summary.files_processed())?;

        if updates > 0 {
            let count = if self.color {
                updates.to_string().green().to_string()
            } else {
                updates.to_string()
            };
            writeln!(
                writer,
                "  {} formula(e) updated ({})",
                count,
                self.format_change_breakdown(summary)
            )?;
        } else if self.color {
            writeln!(writer, "  {}", "No formulae updated".dimmed())?;
        } else {
            writeln!(writer, "  No formulae updated")?;
        }

        if stale > 0 {
            let line = format!("  {} checksum(s) left unchanged", stale);
            if self.color {
                writeln!(writer, "{}", line.yellow())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        if skips > 0 {
            write!(writer, "  {} formula(e) skipped", skips)?;
            if self.verbosity == Verbosity::Verbose {
                let parts: Vec<_> = self
                    .count_by_skip_reason(summary)
                    .iter()
                    .map(|(reason, count)| format!("{} {}", count, reason))
                    .collect();
                if !parts.is_empty() {
                    write!(writer, " ({})", parts.join(", "))?;
                }
            }
            writeln!(writer)?;
        }

        if self.verbosity == Verbosity::Verbose {
            self.format_ecosystem_breakdown(summary, writer)?;
        }
        Ok(())
    }

    fn format_formula(&self, formula: &FormulaUpdateResult, writer: &mut dyn Write) -> std::io::Result<()> {
        self.format_formula_block(formula, writer)
    }
}
