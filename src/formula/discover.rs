//! Formula discovery
//!
//! Walks the target directory recursively and collects every `*.rb` file.
//! Paths containing any ignore pattern (matched against the path relative
//! to the root) are skipped, as are version control directories.

use crate::error::FormulaError;
use std::fs;
use std::path::{Path, PathBuf};

/// Formula file extension
const FORMULA_EXTENSION: &str = "rb";

/// Directory names never descended into
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Discover all formulae below `root`, sorted by path
pub fn discover_formulae(root: &Path, ignore: &[String]) -> Result<Vec<PathBuf>, FormulaError> {
    if !root.is_dir() {
        return Err(FormulaError::directory_not_found(root));
    }

    let mut formulae = Vec::new();
    walk(root, root, ignore, &mut formulae)?;
    formulae.sort();
    Ok(formulae)
}

fn walk(root: &Path, dir: &Path, ignore: &[String], found: &mut Vec<PathBuf>) -> Result<(), FormulaError> {
    let entries = fs::read_dir(dir).map_err(|e| FormulaError::WalkError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| FormulaError::WalkError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if is_ignored(root, &path, ignore) {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| FormulaError::WalkError {
            path: path.clone(),
            source: e,
        })?;
        if file_type.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIPPED_DIRS.contains(&n));
            if !skipped {
                walk(root, &path, ignore, found)?;
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(FORMULA_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}

/// Returns true if the path relative to `root` contains an ignore pattern
fn is_ignored(root: &Path, path: &Path, ignore: &[String]) -> bool {
    if ignore.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    ignore
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| relative.contains(pattern.as_str()))
}
