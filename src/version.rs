//! Version normalization and ordering
//!
//! Upstream tags are not uniformly prefixed (`v1.2.3` vs `1.2.3`) and
//! often abbreviated (`1.2`). This module maps them onto strict semantic
//! versions without touching the raw string, which is still needed to
//! rebuild file names and URLs.

use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A version token in canonical `vMAJOR.MINOR.PATCH` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalVersion(Version);

impl CanonicalVersion {
    /// Returns the underlying semantic version
    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl Ord for CanonicalVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl PartialOrd for CanonicalVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CanonicalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Parses a `v`-prefixed strict version, accepting `v1` and `v1.2` shorthand.
fn parse_strict(tagged: &str) -> Option<Version> {
    let body = tagged.strip_prefix('v')?;
    let parts: Vec<&str> = body.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| !is_numeric_component(p)) {
        return None;
    }
    let padded = match parts.len() {
        1 => format!("{}.0.0", body),
        2 => format!("{}.0", body),
        _ => body.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Decimal component without leading zeros
fn is_numeric_component(part: &str) -> bool {
    !part.is_empty()
        && part.chars().all(|c| c.is_ascii_digit())
        && (part == "0" || !part.starts_with('0'))
}

/// Maps a raw version token to its canonical form
///
/// Tokens that are already `v`-prefixed are checked as-is, otherwise a
/// `v` is prepended first. Pre-releases, build metadata and arbitrary
/// strings have no canonical form.
pub fn normalize(raw: &str) -> Option<CanonicalVersion> {
    parse_strict(raw)
        .or_else(|| parse_strict(&format!("v{}", raw)))
        .map(CanonicalVersion)
}

/// Orders two canonical versions by semantic-version precedence
pub fn compare(a: &CanonicalVersion, b: &CanonicalVersion) -> Ordering {
    a.cmp(b)
}

/// Orders two raw tokens; tokens without a canonical form sort lowest
fn compare_raw(a: &str, b: &str) -> Ordering {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts raw version tokens newest first
///
/// Ties on the normalized value prefer the more specific token, so a
/// project tagging both `1.2` and `1.2.0` yields `1.2.0` first.
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| {
        compare_raw(b, a).then_with(|| b.matches('.').count().cmp(&a.matches('.').count()))
    });
}
