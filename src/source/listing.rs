//! Directory listing source
//!
//! Many upstreams publish releases as one directory per version under a
//! common parent (`.../hadoop/core/hadoop-2.6.0/`). The parent page is an
//! ordinary HTML index whose anchor texts name the sibling versions.

use crate::domain::{Dependency, Ecosystem};
use crate::error::{ReferenceError, SourceError};
use crate::http::HttpClient;
use crate::source::VersionSource;
use crate::template;
use crate::version;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Dotted numeric version run inside a path segment
static VERSION_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").unwrap());

/// Anchor elements that link somewhere
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Where to look for sibling versions of a reference
#[derive(Debug, Clone)]
pub struct Listing {
    /// URL of the parent directory page
    pub url: String,
    /// The path segment that carries the current version
    pub segment: String,
    /// Matches anchor texts naming a sibling; group 1 is the version
    pub pattern: Regex,
}

/// Locates the listing page and sibling pattern for a dependency
///
/// The first path segment containing the current version is the one that
/// varies between releases; everything before it is the listing page.
pub fn locate(dependency: &Dependency) -> Result<Listing, ReferenceError> {
    let concrete = template::materialize(&dependency.path, &dependency.version, &dependency.version);
    let mut parsed =
        Url::parse(&concrete).map_err(|e| ReferenceError::invalid_url(&dependency.path, e.to_string()))?;

    if dependency.version.is_empty() {
        return Err(ReferenceError::version_not_in_path(&dependency.path, &dependency.version));
    }

    let segments: Vec<String> = parsed.path().split('/').map(str::to_string).collect();
    let index = segments
        .iter()
        .position(|s| s.contains(&dependency.version))
        .ok_or_else(|| ReferenceError::version_not_in_path(&dependency.path, &dependency.version))?;
    let segment = segments[index].clone();

    let pattern = sibling_pattern(&segment).ok_or_else(|| ReferenceError::NoVersionPattern {
        path: dependency.path.clone(),
        segment: segment.clone(),
    })?;

    parsed.set_path(&segments[..index].join("/"));
    parsed.set_fragment(None);

    Ok(Listing {
        url: parsed.to_string(),
        segment,
        pattern,
    })
}

/// Turns a version-bearing segment into a pattern matching its siblings
///
/// The pattern is anchored so pre-release siblings such as
/// `hadoop-3.0.0-alpha1` are not mistaken for `hadoop-3.0.0`.
fn sibling_pattern(segment: &str) -> Option<Regex> {
    if !VERSION_RUN.is_match(segment) {
        return None;
    }
    let mut pattern = String::from("^");
    let mut last = 0;
    for run in VERSION_RUN.find_iter(segment) {
        pattern.push_str(&regex::escape(&segment[last..run.start()]));
        pattern.push_str(r"(\d+\.\d+\.\d+)");
        last = run.end();
    }
    pattern.push_str(&regex::escape(&segment[last..]));
    pattern.push_str("/?$");
    Regex::new(&pattern).ok()
}

/// Extracts the visible text of every `<a href>` element
pub fn extract_anchor_texts(html: &str) -> Vec<String> {
    Html::parse_document(html)
        .select(&ANCHOR)
        .map(|anchor| anchor.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Directory listing version source
#[derive(Clone)]
pub struct ListingSource {
    client: HttpClient,
}

impl ListingSource {
    /// Create a new directory listing source
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersionSource for ListingSource {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::DirectoryListing
    }

    fn source_name(&self) -> &'static str {
        "directory listing"
    }

    async fn list_candidates(&self, dependency: &Dependency) -> Result<Vec<String>, SourceError> {
        let listing = locate(dependency)?;
        debug!(url = %listing.url, segment = %listing.segment, "fetching directory listing");

        let html = self.client.get_text(&listing.url, self.source_name()).await?;
        let mut candidates: Vec<String> = extract_anchor_texts(&html)
            .iter()
            .filter_map(|text| listing.pattern.captures(text))
            .map(|caps| caps[1].to_string())
            .collect();

        version::sort_descending(&mut candidates);
        candidates.dedup();
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const HADOOP: &str = "https://archive.apache.org/dist/hadoop/core/hadoop-2.6.0/hadoop-2.6.0.tar.gz";

    #[test]
    fn test_locate_hadoop() {
        let listing = locate(&Dependency::new(HADOOP, "2.6.0")).unwrap();
        assert_eq!(listing.url, "https://archive.apache.org/dist/hadoop/core");
        assert_eq!(listing.segment, "hadoop-2.6.0");
        let caps = listing.pattern.captures("hadoop-2.6.5/").unwrap();
        assert_eq!(&caps[1], "2.6.5");
        assert!(listing.pattern.is_match("hadoop-2.6.5"));
        assert!(!listing.pattern.is_match("hadoop-3.0.0-alpha1/"));
    }

    #[test]
    fn test_locate_template_file_in_flat_directory() {
        let dep = Dependency::new("https://libvirt.org/sources/libvirt-#{VERSION}.tar.gz", "1.0.2");
        let listing = locate(&dep).unwrap();
        assert_eq!(listing.url, "https://libvirt.org/sources");
        assert_eq!(listing.segment, "libvirt-1.0.2.tar.gz");
        let caps = listing.pattern.captures("libvirt-6.10.0.tar.gz").unwrap();
        assert_eq!(&caps[1], "6.10.0");
    }

    #[test]
    fn test_locate_escapes_literal_parts() {
        let dep = Dependency::new("https://example.com/pub/tool+extra-1.0.0.tar.gz", "1.0.0");
        let listing = locate(&dep).unwrap();
        assert!(listing.pattern.is_match("tool+extra-1.1.0.tar.gz"));
        assert!(!listing.pattern.is_match("toolextra-1.1.0.tar.gz"));
    }

    #[test]
    fn test_locate_version_missing() {
        let dep = Dependency::new("https://example.com/pub/tool.tar.gz", "1.0.0");
        assert!(matches!(locate(&dep), Err(ReferenceError::VersionNotInPath { .. })));
    }

    #[test]
    fn test_locate_version_without_numeric_run() {
        let dep = Dependency::new("https://example.com/pub/tool-12/tool.tar.gz", "12");
        assert!(matches!(locate(&dep), Err(ReferenceError::NoVersionPattern { .. })));
    }

    #[test]
    fn test_locate_round_trip() {
        let path = "https://downloads.example.org/releases/#{version}/tool-#{version}-linux.tgz";
        for version in ["1.0.0", "2.13.7", "10.0.1"] {
            let listing = locate(&Dependency::new(path, version)).unwrap();
            let caps = listing.pattern.captures(&listing.segment).unwrap();
            assert_eq!(&caps[1], version);
        }
    }

    #[test]
    fn test_extract_anchor_texts() {
        let html = r#"<html><body>
            <a href="?C=N;O=D">Name</a>
            <A HREF="hadoop-2.6.5/"><img src="folder.gif"> hadoop-2.6.5/</A>
            <a name="top">anchor without href</a>
        </body></html>"#;
        assert_eq!(extract_anchor_texts(html), vec!["Name", "hadoop-2.6.5/"]);
    }

    #[test]
    fn test_extract_anchor_texts_decodes_entities() {
        let html = r#"<a title="a > b" href="tool&#45;1.2.0/">tool&#45;1.2.0/</a>
            <a href="x?a=1&amp;b=2">tool-1.3.0 &amp; docs</a>"#;
        assert_eq!(
            extract_anchor_texts(html),
            vec!["tool-1.2.0/", "tool-1.3.0 & docs"]
        );
    }

    #[tokio::test]
    async fn test_list_candidates_hadoop_listing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/dist/hadoop/core")
            .with_status(200)
            .with_body(
                r#"<a href="../">Parent Directory</a>
                <a href="hadoop-2.6.0/">hadoop-2.6.0/</a>
                <a href="hadoop-2.6.5/">hadoop-2.6.5/</a>
                <a href="hadoop-2.10.1/">hadoop-2.10.1/</a>
                <a href="hadoop-3.0.0-alpha1/">hadoop-3.0.0-alpha1/</a>"#,
            )
            .create_async()
            .await;

        let dep = Dependency::new(
            format!("{}/dist/hadoop/core/hadoop-2.6.0/hadoop-2.6.0.tar.gz", server.url()),
            "2.6.0",
        );
        let source = ListingSource::new(HttpClient::new().unwrap());
        let candidates = source.list_candidates(&dep).await.unwrap();

        assert_eq!(candidates, vec!["2.10.1", "2.6.5", "2.6.0"]);
    }

    #[tokio::test]
    async fn test_list_candidates_malformed_reference() {
        let dep = Dependency::new("https://example.com/pub/tool.tar.gz", "1.0.0");
        let source = ListingSource::new(HttpClient::new().unwrap());
        let result = source.list_candidates(&dep).await;
        assert!(matches!(result, Err(SourceError::MalformedReference(_))));
    }
}
