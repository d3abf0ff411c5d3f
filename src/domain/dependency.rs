//! Dependency references and resolved updates

use serde::{Deserialize, Serialize};
use std::fmt;

/// A versioned download reference found in a formula
///
/// `path` either carries a `#{version}` placeholder or embeds the
/// current version literally. Which one applies is decided by pattern
/// matching at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Templated or literal download URL
    pub path: String,
    /// Current version string as written in the formula
    pub version: String,
}

impl Dependency {
    /// Creates a new dependency reference
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// A resolved upgrade decision
///
/// `next` always compares strictly greater than `previous` for the
/// ecosystem the reference belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Update {
    /// Reference path the decision applies to
    pub path: String,
    /// Version currently recorded
    pub previous: String,
    /// Version to move to
    pub next: String,
}

impl Update {
    /// Creates a new update decision
    pub fn new(
        path: impl Into<String>,
        previous: impl Into<String>,
        next: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            previous: previous.into(),
            next: next.into(),
        }
    }

    /// Builds the update for a dependency and a winning candidate
    ///
    /// Tags that carry a `v` the formula's own version does not are
    /// stripped, so text substitution keeps the formula's convention.
    pub fn from_candidate(dependency: &Dependency, candidate: &str) -> Self {
        let next = match candidate.strip_prefix('v') {
            Some(bare)
                if !dependency.version.starts_with('v')
                    && bare.starts_with(|c: char| c.is_ascii_digit()) =>
            {
                bare
            }
            _ => candidate,
        };
        Self::new(&dependency.path, &dependency.version, next)
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.previous, self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_new() {
        let dep = Dependency::new("https://libvirt.org/sources/libvirt-#{VERSION}.tar.gz", "1.0.2");
        assert_eq!(dep.version, "1.0.2");
        assert!(dep.path.contains("#{VERSION}"));
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("https://example.com/tool-1.0.0.tar.gz", "1.0.0");
        assert_eq!(dep.to_string(), "https://example.com/tool-1.0.0.tar.gz@1.0.0");
    }

    #[test]
    fn test_update_display() {
        let update = Update::new("https://example.com", "1.0.0", "1.1.0");
        assert_eq!(update.to_string(), "1.0.0 → 1.1.0");
    }

    #[test]
    fn test_update_from_candidate_plain() {
        let dep = Dependency::new("https://example.com", "10.7.0");
        let update = Update::from_candidate(&dep, "10.8.0");
        assert_eq!(update.previous, "10.7.0");
        assert_eq!(update.next, "10.8.0");
    }

    #[test]
    fn test_update_from_candidate_strips_tag_prefix() {
        let dep = Dependency::new("https://github.com/Azure/azcopy/archive/v#{version}.tar.gz", "10.7.0");
        let update = Update::from_candidate(&dep, "v10.8.0");
        assert_eq!(update.next, "10.8.0");
    }

    #[test]
    fn test_update_from_candidate_keeps_prefix_when_formula_uses_it() {
        let dep = Dependency::new("https://example.com", "v1.0.0");
        let update = Update::from_candidate(&dep, "v1.1.0");
        assert_eq!(update.next, "v1.1.0");
    }

    #[test]
    fn test_serde_update() {
        let update = Update::new("https://example.com", "1.0.0", "1.1.0");
        let json = serde_json::to_string(&update).unwrap();
        let parsed: Update = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, update);
    }
}
