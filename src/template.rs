//! URL template substitution
//!
//! References either carry a `#{version}` placeholder or embed the
//! version literally. Both are turned into a concrete URL here.

use crate::domain::Update;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Version placeholder used by formulae, matched case-insensitively
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#\{version\}").unwrap());

/// Returns true if the reference carries a version placeholder
pub fn has_placeholder(path: &str) -> bool {
    PLACEHOLDER.is_match(path)
}

/// Builds the concrete URL of `path` for `version`
///
/// `previous` is the version currently embedded in a literal reference;
/// it is ignored when the reference carries a placeholder.
pub fn materialize(path: &str, previous: &str, version: &str) -> String {
    if has_placeholder(path) {
        return PLACEHOLDER.replace_all(path, NoExpand(version)).into_owned();
    }
    replace_version(path, previous, version)
}

/// Swaps `previous` for `next` throughout `text`
///
/// A second pass swaps both strings with their first character dropped.
/// This covers tags such as `v1.2.3` whose artifacts are named
/// `tool-1.2.3.tar.gz`. It only works for a single-character prefix.
pub fn replace_version(text: &str, previous: &str, next: &str) -> String {
    if previous.is_empty() {
        return text.to_string();
    }
    let replaced = text.replace(previous, next);
    match (strip_first(previous), strip_first(next)) {
        (Some(prev_tail), Some(next_tail)) if !prev_tail.is_empty() => {
            replaced.replace(prev_tail, next_tail)
        }
        _ => replaced,
    }
}

fn strip_first(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    chars.next()?;
    Some(chars.as_str())
}

/// Rewrites a URL recorded for `update.previous` to point at `update.next`
pub fn updated_url(old_url: &str, update: &Update) -> String {
    replace_version(old_url, &update.previous, &update.next)
}
