//! Upstream version sources
//!
//! This module provides:
//! - GitHub releases source (tagged releases)
//! - Directory listing source (plain HTML file indexes)
//! - Go release index source (machine-readable JSON index)
//!
//! Each source returns raw candidate strings exactly as published; ordering
//! is source specific and documented on each implementation.

mod github;
mod golang;
mod listing;

pub use github::{parse_repository, GitHubClient, Release, ReleaseAsset, GITHUB_API_URL};
pub use golang::{
    file_digest, historic_filename, GolangIndex, IndexedFile, IndexedRelease,
    GOLANG_HISTORY_URL, GOLANG_INDEX_URL,
};
pub use listing::{extract_anchor_texts, locate, Listing, ListingSource};

use crate::domain::{Dependency, Ecosystem};
use crate::error::SourceError;
use crate::http::HttpClient;
use async_trait::async_trait;

/// Trait for upstream version sources
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Get the ecosystem this source handles
    fn ecosystem(&self) -> Ecosystem;

    /// Get the source name used in errors and logs
    fn source_name(&self) -> &'static str;

    /// List the release identifiers known for a dependency
    async fn list_candidates(&self, dependency: &Dependency) -> Result<Vec<String>, SourceError>;
}

/// Endpoints and credentials shared by all sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// GitHub REST API base URL
    pub github_api_url: String,
    /// Optional GitHub token sent as a bearer credential
    pub github_token: Option<String>,
    /// Current Go release index
    pub golang_index_url: String,
    /// Go release index including historical releases
    pub golang_history_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            github_api_url: GITHUB_API_URL.to_string(),
            github_token: None,
            golang_index_url: GOLANG_INDEX_URL.to_string(),
            golang_history_url: GOLANG_HISTORY_URL.to_string(),
        }
    }
}

impl SourceConfig {
    /// Builds the GitHub client described by this configuration
    pub fn github(&self, client: HttpClient) -> GitHubClient {
        GitHubClient::new(client)
            .with_api_url(&self.github_api_url)
            .with_token(self.github_token.clone())
    }

    /// Builds the Go release index described by this configuration
    pub fn golang(&self, client: HttpClient) -> GolangIndex {
        GolangIndex::new(client, &self.golang_index_url, &self.golang_history_url)
    }
}

/// Create a version source for the given ecosystem
pub fn create_source(
    ecosystem: Ecosystem,
    client: HttpClient,
    config: &SourceConfig,
) -> Box<dyn VersionSource> {
    match ecosystem {
        Ecosystem::TagRelease => Box::new(config.github(client)),
        Ecosystem::DirectoryListing => Box::new(ListingSource::new(client)),
        Ecosystem::IndexFile => Box::new(config.golang(client)),
    }
}
