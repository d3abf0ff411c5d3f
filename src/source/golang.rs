//! Go release index source
//!
//! Fetches toolchain releases from the Go download index.
//! Endpoints:
//! - Current releases: https://golang.org/dl/?mode=json
//! - All releases with file digests: a mirror of the full historical index
//!
//! Entries look like `{"version": "go1.15.8", "files": [{"filename", "sha256"}]}`.

use crate::domain::{Dependency, Ecosystem};
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::source::VersionSource;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Index of current Go releases
pub const GOLANG_INDEX_URL: &str = "https://golang.org/dl/?mode=json";

/// Index of all Go releases, including ones dropped from the current index
pub const GOLANG_HISTORY_URL: &str =
    "https://raw.githubusercontent.com/WillAbides/goreleases/main/releases.json";

/// Prefix carried by every version in the index
const VERSION_PREFIX: &str = "go";

/// One release entry in the index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexedRelease {
    pub version: String,
    #[serde(default)]
    pub files: Vec<IndexedFile>,
}

impl IndexedRelease {
    /// Version without its `go` prefix, if the entry carries one
    pub fn bare_version(&self) -> Option<&str> {
        self.version.strip_prefix(VERSION_PREFIX)
    }
}

/// One downloadable file of a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexedFile {
    pub filename: String,
    #[serde(default)]
    pub sha256: String,
}

/// Finds the file name whose published digest is `digest`
pub fn historic_filename<'a>(releases: &'a [IndexedRelease], digest: &str) -> Option<&'a str> {
    releases
        .iter()
        .flat_map(|r| r.files.iter())
        .find(|f| !f.sha256.is_empty() && f.sha256.eq_ignore_ascii_case(digest))
        .map(|f| f.filename.as_str())
}

/// Finds the published digest of `filename` in release `version`
pub fn file_digest<'a>(releases: &'a [IndexedRelease], version: &str, filename: &str) -> Option<&'a str> {
    releases
        .iter()
        .filter(|r| r.bare_version() == Some(version))
        .flat_map(|r| r.files.iter())
        .find(|f| f.filename == filename)
        .map(|f| f.sha256.as_str())
}

/// Go release index client and version source
#[derive(Clone)]
pub struct GolangIndex {
    client: HttpClient,
    index_url: String,
    history_url: String,
}

impl GolangIndex {
    /// Create a new index client
    pub fn new(client: HttpClient, index_url: &str, history_url: &str) -> Self {
        Self {
            client,
            index_url: index_url.to_string(),
            history_url: history_url.to_string(),
        }
    }

    /// Fetches the current index
    pub async fn fetch_current(&self) -> Result<Vec<IndexedRelease>, SourceError> {
        self.client.get_json(&self.index_url, self.source_name()).await
    }

    /// Fetches the historical index
    pub async fn fetch_history(&self) -> Result<Vec<IndexedRelease>, SourceError> {
        self.client.get_json(&self.history_url, self.source_name()).await
    }
}

#[async_trait]
impl VersionSource for GolangIndex {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::IndexFile
    }

    fn source_name(&self) -> &'static str {
        "Go release index"
    }

    /// Candidates are returned in published order
    async fn list_candidates(&self, _dependency: &Dependency) -> Result<Vec<String>, SourceError> {
        let releases = self.fetch_current().await?;
        debug!(releases = releases.len(), "fetched Go release index");
        Ok(releases
            .iter()
            .filter_map(IndexedRelease::bare_version)
            .map(str::to_string)
            .collect())
    }
}
