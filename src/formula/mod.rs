//! Formula discovery, parsing and rewriting
//!
//! This module provides functionality to:
//! - Discover `*.rb` formulae below a root directory
//! - Extract the versioned download reference of a formula
//! - Extract the recorded checksums of a formula
//! - Rewrite a formula for a resolved update

mod discover;
mod writer;

pub use discover::discover_formulae;
pub use writer::{read_formula, write_formula, FormulaWriter};

use crate::domain::{Dependency, Update};
use crate::template;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

/// `url "..."` or `url '...'`
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"url ["'](.*)["']"#).unwrap());

/// `version '1.2.3'`, `VERSION = "1.2.3"` and similar
static VERSION_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)version\s*=?\s+["'](.*)["']"#).unwrap());

/// First dotted numeric version in a literal URL
static LITERAL_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").unwrap());

/// `sha256 '<hex>'` checksum declarations
static CHECKSUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*sha(?:1|256|512)\s+["']([0-9a-fA-F]+)["']"#).unwrap());

/// Extracts the versioned download reference of a formula
///
/// A formula contributes a dependency only when it declares exactly one
/// `url`. A templated URL takes its version from the version variable;
/// a literal URL takes the first dotted numeric version in its path, so a
/// numeric host such as `127.0.0.1` is never mistaken for the version.
pub fn parse_dependency(content: &str) -> Option<Dependency> {
    let urls: Vec<&str> = URL
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    let [url] = urls.as_slice() else {
        return None;
    };

    if template::has_placeholder(url) {
        if let Some(version) = VERSION_VAR.captures(content).and_then(|c| c.get(1)) {
            return Some(Dependency::new(*url, version.as_str()));
        }
    }

    let parsed = Url::parse(url).ok();
    let haystack = parsed.as_ref().map_or(*url, |u| u.path());
    LITERAL_VERSION
        .find(haystack)
        .map(|version| Dependency::new(*url, version.as_str()))
}

/// Extracts every checksum recorded in a formula, in declaration order
pub fn parse_checksums(content: &str) -> Vec<String> {
    CHECKSUM
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Rewrites a formula for `update`, swapping the checksum when given
///
/// All substitutions happen in a single left-to-right pass, so a new
/// value is never rewritten by a later pair.
pub fn apply_update(content: &str, update: &Update, checksum: Option<(&str, &str)>) -> String {
    let mut pairs: Vec<(&str, &str)> = vec![(update.previous.as_str(), update.next.as_str())];
    if let Some(pair) = checksum {
        pairs.push(pair);
    }
    replace_simultaneously(content, &pairs)
}

/// Replaces every `old` with its `new` in one pass
///
/// At any position the earliest listed pair wins.
fn replace_simultaneously(content: &str, pairs: &[(&str, &str)]) -> String {
    let pairs: Vec<&(&str, &str)> = pairs.iter().filter(|(old, _)| !old.is_empty()).collect();
    if pairs.is_empty() {
        return content.to_string();
    }
    let alternation = pairs
        .iter()
        .map(|(old, _)| regex::escape(old))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(pattern) = Regex::new(&alternation) else {
        return content.to_string();
    };
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            let matched = &caps[0];
            pairs
                .iter()
                .find(|(old, _)| *old == matched)
                .map(|(_, new)| new.to_string())
                .unwrap_or_else(|| matched.to_string())
        })
        .into_owned()
}
