//! GitHub releases source
//!
//! Lists tagged releases through the GitHub REST API.
//! API endpoints:
//! - List releases: {api}/repos/{owner}/{repo}/releases?per_page=100&page={n}
//! - Release by tag: {api}/repos/{owner}/{repo}/releases/tags/{tag}

use crate::domain::{Dependency, Ecosystem};
use crate::error::{ReferenceError, SourceError};
use crate::http::HttpClient;
use crate::source::VersionSource;
use crate::version;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

/// GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Releases requested per page
const PER_PAGE: usize = 100;

/// Upper bound on pages fetched when listing releases
const MAX_PAGES: usize = 5;

/// A release as returned by the releases API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub tarball_url: Option<String>,
    #[serde(default)]
    pub zipball_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Source archive URLs GitHub generates for the release tag
    pub fn source_urls(&self) -> Vec<String> {
        let archive_root = self.html_url.replace("releases/tag", "archive");
        let mut urls: Vec<String> = self
            .tarball_url
            .iter()
            .chain(self.zipball_url.iter())
            .cloned()
            .collect();
        if !archive_root.is_empty() {
            urls.push(format!("{}.tar.gz", archive_root));
            urls.push(format!("{}.zip", archive_root));
        }
        urls
    }
}

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

/// Extracts the owner and repository name from a github.com reference
///
/// The path is split into at most four segments; the second and third
/// name the repository.
pub fn parse_repository(path: &str) -> Result<(String, String), ReferenceError> {
    let parsed = Url::parse(path).map_err(|e| ReferenceError::invalid_url(path, e.to_string()))?;
    let segments: Vec<&str> = parsed.path().splitn(4, '/').collect();
    match (segments.get(1), segments.get(2)) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ReferenceError::NotARepository {
            path: path.to_string(),
        }),
    }
}

/// GitHub releases client and version source
#[derive(Clone)]
pub struct GitHubClient {
    client: HttpClient,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a new GitHub client against the public API
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            api_url: GITHUB_API_URL.to_string(),
            token: None,
        }
    }

    /// Use a different API base URL
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Authenticate requests with a token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("ignoring GitHub token with invalid characters"),
            }
        }
        headers
    }

    /// Build the URL for a page of releases
    fn build_list_url(&self, owner: &str, repo: &str, page: usize) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}&page={}",
            self.api_url, owner, repo, PER_PAGE, page
        )
    }

    /// Build the URL for a release by tag
    fn build_tag_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        format!("{}/repos/{}/{}/releases/tags/{}", self.api_url, owner, repo, tag)
    }

    /// Lists releases, following pages until a short page or the page limit
    pub async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, SourceError> {
        let mut releases = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = self.build_list_url(owner, repo, page);
            let batch: Vec<Release> = self
                .client
                .get_with_headers(&url, self.source_name(), self.headers())
                .await?
                .json()
                .await
                .map_err(|e| {
                    SourceError::invalid_response(&url, self.source_name(), e.to_string())
                })?;
            let short = batch.len() < PER_PAGE;
            releases.extend(batch);
            if short {
                break;
            }
        }
        debug!(owner, repo, releases = releases.len(), "fetched releases");
        Ok(releases)
    }

    async fn fetch_release(&self, owner: &str, repo: &str, tag: &str) -> Result<Release, SourceError> {
        let url = self.build_tag_url(owner, repo, tag);
        self.client
            .get_with_headers(&url, self.source_name(), self.headers())
            .await?
            .json()
            .await
            .map_err(|e| SourceError::invalid_response(&url, self.source_name(), e.to_string()))
    }

    /// Looks up a release by its exact tag
    ///
    /// A bare version such as `1.2.3` that is not found is retried once
    /// as `v1.2.3`; any other failure is returned as is.
    pub async fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release, SourceError> {
        match self.fetch_release(owner, repo, tag).await {
            Err(e) if e.is_not_found() && !tag.starts_with('v') && version::normalize(tag).is_some() => {
                debug!(owner, repo, tag, "release not found, retrying with v prefix");
                self.fetch_release(owner, repo, &format!("v{}", tag)).await
            }
            result => result,
        }
    }
}

#[async_trait]
impl VersionSource for GitHubClient {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::TagRelease
    }

    fn source_name(&self) -> &'static str {
        "GitHub"
    }

    async fn list_candidates(&self, dependency: &Dependency) -> Result<Vec<String>, SourceError> {
        let (owner, repo) = parse_repository(&dependency.path)?;
        let mut tags: Vec<String> = self
            .list_releases(&owner, &repo)
            .await?
            .into_iter()
            .map(|r| r.tag_name)
            .collect();
        version::sort_descending(&mut tags);
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> GitHubClient {
        GitHubClient::new(HttpClient::new().unwrap()).with_api_url(&server.url())
    }

    fn releases_json(tags: &[&str]) -> String {
        let releases: Vec<serde_json::Value> = tags
            .iter()
            .map(|t| serde_json::json!({ "tag_name": t, "assets": [] }))
            .collect();
        serde_json::to_string(&releases).unwrap()
    }

    #[test]
    fn test_parse_repository() {
        let (owner, repo) = parse_repository(
            "https://github.com/Azure/azure-storage-azcopy/archive/v#{version}.tar.gz",
        )
        .unwrap();
        assert_eq!(owner, "Azure");
        assert_eq!(repo, "azure-storage-azcopy");
    }

    #[test]
    fn test_parse_repository_missing_repo() {
        assert!(matches!(
            parse_repository("https://github.com/Azure"),
            Err(ReferenceError::NotARepository { .. })
        ));
        assert!(matches!(
            parse_repository("not a url"),
            Err(ReferenceError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_build_urls() {
        let client = GitHubClient::new(HttpClient::new().unwrap());
        assert_eq!(
            client.build_list_url("o", "r", 2),
            "https://api.github.com/repos/o/r/releases?per_page=100&page=2"
        );
        assert_eq!(
            client.build_tag_url("o", "r", "v1.0.0"),
            "https://api.github.com/repos/o/r/releases/tags/v1.0.0"
        );
    }

    #[test]
    fn test_release_source_urls() {
        let release = Release {
            tag_name: "v1.0.0".to_string(),
            html_url: "https://github.com/o/r/releases/tag/v1.0.0".to_string(),
            tarball_url: Some("https://api.github.com/repos/o/r/tarball/v1.0.0".to_string()),
            zipball_url: None,
            assets: vec![],
        };
        assert_eq!(
            release.source_urls(),
            vec![
                "https://api.github.com/repos/o/r/tarball/v1.0.0",
                "https://github.com/o/r/archive/v1.0.0.tar.gz",
                "https://github.com/o/r/archive/v1.0.0.zip",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_candidates_sorted_descending() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/Azure/azcopy/releases")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(releases_json(&["v10.7.0", "10.8.0", "nightly"]))
            .create_async()
            .await;

        let dep = Dependency::new("https://github.com/Azure/azcopy/archive/v#{version}.tar.gz", "10.7.0");
        let tags = client_for(&server).list_candidates(&dep).await.unwrap();

        assert_eq!(tags, vec!["10.8.0", "v10.7.0", "nightly"]);
    }

    #[tokio::test]
    async fn test_list_releases_follows_full_pages() {
        let mut server = Server::new_async().await;
        let full: Vec<String> = (0..100).map(|i| format!("1.0.{}", i)).collect();
        let full_refs: Vec<&str> = full.iter().map(String::as_str).collect();
        let _page1 = server
            .mock("GET", "/repos/o/r/releases")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(releases_json(&full_refs))
            .create_async()
            .await;
        let _page2 = server
            .mock("GET", "/repos/o/r/releases")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(releases_json(&["2.0.0"]))
            .create_async()
            .await;

        let releases = client_for(&server).list_releases("o", "r").await.unwrap();
        assert_eq!(releases.len(), 101);
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/o/r/releases/tags/v1.0.0")
            .match_header("authorization", "Bearer secret")
            .with_body(r#"{"tag_name":"v1.0.0"}"#)
            .create_async()
            .await;

        let client = client_for(&server).with_token(Some("secret".to_string()));
        let release = client.release_by_tag("o", "r", "v1.0.0").await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn test_release_by_tag_retries_with_prefix() {
        let mut server = Server::new_async().await;
        let _bare = server
            .mock("GET", "/repos/o/r/releases/tags/1.2.3")
            .with_status(404)
            .create_async()
            .await;
        let _prefixed = server
            .mock("GET", "/repos/o/r/releases/tags/v1.2.3")
            .with_body(r#"{"tag_name":"v1.2.3","html_url":"https://github.com/o/r/releases/tag/v1.2.3"}"#)
            .create_async()
            .await;

        let release = client_for(&server).release_by_tag("o", "r", "1.2.3").await.unwrap();
        assert_eq!(release.tag_name, "v1.2.3");
    }

    #[tokio::test]
    async fn test_release_by_tag_no_retry_for_prefixed_tag() {
        let mut server = Server::new_async().await;
        let missing = server
            .mock("GET", "/repos/o/r/releases/tags/v1.2.3")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let result = client_for(&server).release_by_tag("o", "r", "v1.2.3").await;

        missing.assert_async().await;
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_release_by_tag_server_error_not_retried() {
        let mut server = Server::new_async().await;
        let _bare = server
            .mock("GET", "/repos/o/r/releases/tags/1.2.3")
            .with_status(500)
            .create_async()
            .await;
        let prefixed = server
            .mock("GET", "/repos/o/r/releases/tags/v1.2.3")
            .expect(0)
            .create_async()
            .await;

        let result = client_for(&server).release_by_tag("o", "r", "1.2.3").await;

        prefixed.assert_async().await;
        assert!(matches!(result, Err(SourceError::Network { .. })));
    }
}
