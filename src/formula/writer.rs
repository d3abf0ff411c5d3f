//! Formula file reading and writing
//!
//! This module provides:
//! - FormulaWriter for persisting rewritten formulae
//! - Dry-run mode support (no actual file modifications)

use crate::error::FormulaError;
use std::fs;
use std::path::Path;

/// Writer for formula files
#[derive(Debug, Clone, Copy)]
pub struct FormulaWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

impl FormulaWriter {
    /// Create a new FormulaWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Persist `updated` if it differs from `original`
    ///
    /// Returns true if the file was (or in dry-run, would be) modified.
    pub fn write(&self, path: &Path, original: &str, updated: &str) -> Result<bool, FormulaError> {
        if original == updated {
            return Ok(false);
        }
        if !self.dry_run {
            write_formula(path, updated)?;
        }
        Ok(true)
    }
}

/// Read a formula file
pub fn read_formula(path: &Path) -> Result<String, FormulaError> {
    fs::read_to_string(path).map_err(|e| FormulaError::read_error(path, e))
}

/// Write content to a formula file
pub fn write_formula(path: &Path, content: &str) -> Result<(), FormulaError> {
    fs::write(path, content).map_err(|e| FormulaError::write_error(path, e))
}
