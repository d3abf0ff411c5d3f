//! Ecosystem classification for dependency references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of references hosted as GitHub release downloads
const GITHUB_PREFIX: &str = "https://github.com/";

/// Prefixes of the Go toolchain distribution
const GOLANG_PREFIXES: &[&str] = &[
    "https://golang.org/dl/go",
    "https://go.dev/dl/go",
    "https://dl.google.com/go/go",
];

/// Origin strategy used to enumerate releases of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    /// Tagged releases published through a release API
    TagRelease,
    /// A plain web server index page
    DirectoryListing,
    /// A machine-readable release index with published digests
    IndexFile,
}

impl Ecosystem {
    /// Classifies a reference path by literal prefix
    ///
    /// Unknown hosts fall back to the directory listing strategy, which
    /// only assumes a standard index page.
    pub fn classify(path: &str) -> Self {
        if path.starts_with(GITHUB_PREFIX) {
            Ecosystem::TagRelease
        } else if GOLANG_PREFIXES.iter().any(|p| path.starts_with(p)) {
            Ecosystem::IndexFile
        } else {
            Ecosystem::DirectoryListing
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::TagRelease => "GitHub releases",
            Ecosystem::DirectoryListing => "directory listing",
            Ecosystem::IndexFile => "Go release index",
        }
    }

    /// Returns all supported ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::TagRelease,
            Ecosystem::DirectoryListing,
            Ecosystem::IndexFile,
        ]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
