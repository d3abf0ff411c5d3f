//! Integration tests for brewup
//!
//! These tests verify:
//! - Whole-run formula updates against mocked upstreams
//! - Checksum reconciliation for each upstream kind
//! - Settings file handling in the target directory

use brewup::cli::CliArgs;
use brewup::config::Settings;
use brewup::domain::{HashStatus, UpdateResult};
use brewup::http::HttpClient;
use brewup::orchestrator::{Orchestrator, OrchestratorResult};
use clap::Parser;
use mockito::{Matcher, Mock, Server};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
const HELLO_BANG_SHA1: &str = "430ce34d020724ed75a196dfc2ad67c77772d169";
const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
const NEW_SHA256: &str = "d3379c32a90fdf9382166f8f48034c459a8cc433730bc9476d39d9082c94583b";

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Runs the whole workflow over `root` with the given extra CLI arguments
async fn run_brewup(root: &Path, extra: &[&str]) -> OrchestratorResult {
    let root = root.to_string_lossy().to_string();
    let mut argv = vec!["brewup", root.as_str()];
    argv.extend_from_slice(extra);
    let settings = Settings::load(&CliArgs::parse_from(argv)).expect("valid settings");
    Orchestrator::with_client(settings, HttpClient::new().unwrap())
        .run_with_progress(false)
        .await
}

fn only_update(result: &OrchestratorResult) -> &UpdateResult {
    let updates: Vec<_> = result.summary.all_updates().collect();
    assert_eq!(updates.len(), 1, "expected exactly one update: {:?}", updates);
    updates[0]
}

mod github_release_workflow {
    use super::*;

    const AZCOPY: &str = r#"class AzCopy < DebianFormula
  homepage 'https://github.com/Azure/azure-storage-azcopy/'
  version '10.7.0'
  url "https://github.com/Azure/azure-storage-azcopy/archive/v#{version}.tar.gz"
  sha256 'b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9'

  name 'azcopy'
end
"#;

    async fn mock_github(server: &mut Server) -> Vec<Mock> {
        let base = server.url();
        let release = format!(
            r#"{{"tag_name":"v10.7.0","assets":[
                {{"name":"checksums.txt","size":90,"browser_download_url":"{base}/dl/v10.7.0/checksums.txt"}}
            ]}}"#
        );
        vec![
            server
                .mock("GET", "/repos/Azure/azure-storage-azcopy/releases")
                .match_query(Matcher::Any)
                .with_body(r#"[{"tag_name":"v10.8.0"},{"tag_name":"v10.7.0"}]"#)
                .create_async()
                .await,
            server
                .mock("GET", "/repos/Azure/azure-storage-azcopy/releases/tags/10.7.0")
                .with_status(404)
                .create_async()
                .await,
            server
                .mock("GET", "/repos/Azure/azure-storage-azcopy/releases/tags/v10.7.0")
                .with_body(release)
                .create_async()
                .await,
            server
                .mock("GET", "/dl/v10.7.0/checksums.txt")
                .with_body(format!("{}  azcopy_linux_amd64_10.7.0.tar.gz\n", HELLO_SHA256))
                .create_async()
                .await,
            server
                .mock("GET", "/dl/v10.8.0/checksums.txt")
                .with_body(format!("{}  azcopy_linux_amd64_10.8.0.tar.gz\n", NEW_SHA256))
                .create_async()
                .await,
        ]
    }

    /// Test that a tag release update rewrites both version and checksum
    #[tokio::test]
    async fn test_release_update_with_checksum_manifest() {
        let mut server = Server::new_async().await;
        let _mocks = mock_github(&mut server).await;
        let temp_dir = create_test_dir();
        let formula = temp_dir.path().join("azcopy.rb");
        fs::write(&formula, AZCOPY).unwrap();

        let api_url = server.url();
        let result = run_brewup(temp_dir.path(), &["--github-api-url", api_url.as_str()]).await;
        assert!(!result.has_errors(), "{:?}", result.errors);

        match only_update(&result) {
            UpdateResult::Update { update, hash, .. } => {
                assert_eq!(update.previous, "10.7.0");
                assert_eq!(update.next, "10.8.0");
                assert_eq!(
                    hash,
                    &HashStatus::Updated {
                        previous: HELLO_SHA256.to_string(),
                        next: NEW_SHA256.to_string(),
                    }
                );
            }
            other => panic!("unexpected result {:?}", other),
        }

        let written = fs::read_to_string(&formula).unwrap();
        assert!(written.contains("version '10.8.0'"));
        assert!(written.contains(NEW_SHA256));
        assert!(!written.contains(HELLO_SHA256));
    }

    /// Test that a second run over the rewritten formula changes nothing
    #[tokio::test]
    async fn test_release_update_is_idempotent() {
        let mut server = Server::new_async().await;
        let _mocks = mock_github(&mut server).await;
        let temp_dir = create_test_dir();
        let formula = temp_dir.path().join("azcopy.rb");
        fs::write(&formula, AZCOPY).unwrap();

        let api_url = server.url();
        run_brewup(temp_dir.path(), &["--github-api-url", api_url.as_str()]).await;
        let first = fs::read_to_string(&formula).unwrap();

        let second = run_brewup(temp_dir.path(), &["--github-api-url", api_url.as_str()]).await;
        assert_eq!(second.summary.total_updates(), 0);
        assert_eq!(second.summary.total_skips(), 1);
        assert_eq!(fs::read_to_string(&formula).unwrap(), first);
    }

    /// Test that a rate-limited release API is reported without aborting the run
    #[tokio::test]
    async fn test_release_rate_limited() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/repos/Azure/azure-storage-azcopy/releases")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("azcopy.rb"), AZCOPY).unwrap();
        fs::write(temp_dir.path().join("meta.rb"), "class Meta\nend\n").unwrap();

        let api_url = server.url();
        let result = run_brewup(temp_dir.path(), &["--github-api-url", api_url.as_str()]).await;
        assert_eq!(result.summary.files_processed(), 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].to_string().contains("rate limit"));
        assert_eq!(fs::read_to_string(temp_dir.path().join("azcopy.rb")).unwrap(), AZCOPY);
    }
}

mod golang_index_workflow {
    use super::*;

    const GOLANG: &str = r##"class GoLang < DebianFormula
  VERSION = '1.15.6'

  name 'golang'
  url "https://dl.google.com/go/go#{VERSION}.linux-amd64.tar.gz"
  sha256 'b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9'

  version "#{VERSION}+thepwagner1"
end
"##;

    async fn setup(server: &mut Server, temp_dir: &TempDir) -> Vec<Mock> {
        let base = server.url();
        fs::write(
            temp_dir.path().join(".brewup.toml"),
            format!(
                "golang_index_url = \"{base}/dl/?mode=json\"\ngolang_history_url = \"{base}/releases.json\"\n"
            ),
        )
        .unwrap();
        fs::write(temp_dir.path().join("go.rb"), GOLANG).unwrap();

        vec![
            server
                .mock("GET", "/dl/")
                .match_query(Matcher::Any)
                .with_body(format!(
                    r#"[{{"version":"go1.15.8","files":[
                        {{"filename":"go1.15.8.src.tar.gz","sha256":"{}"}},
                        {{"filename":"go1.15.8.linux-amd64.tar.gz","sha256":"{}"}}
                    ]}},{{"version":"go1.14.15","files":[]}}]"#,
                    "e".repeat(64),
                    NEW_SHA256
                ))
                .create_async()
                .await,
            server
                .mock("GET", "/releases.json")
                .with_body(format!(
                    r#"[{{"version":"go1.15.6","files":[
                        {{"filename":"go1.15.6.linux-amd64.tar.gz","sha256":"{}"}}
                    ]}}]"#,
                    HELLO_SHA256
                ))
                .create_async()
                .await,
        ]
    }

    /// Test that the Go index supplies both the new version and its digest
    #[tokio::test]
    async fn test_index_update_uses_published_digest() {
        let mut server = Server::new_async().await;
        let temp_dir = create_test_dir();
        let _mocks = setup(&mut server, &temp_dir).await;

        let result = run_brewup(temp_dir.path(), &[]).await;
        assert!(!result.has_errors(), "{:?}", result.errors);

        let written = fs::read_to_string(temp_dir.path().join("go.rb")).unwrap();
        assert!(written.contains("VERSION = '1.15.8'"));
        assert!(written.contains(NEW_SHA256));
        assert!(written.contains("version \"#{VERSION}+thepwagner1\""));
    }

    /// Test that dry-run reports the update without touching the formula
    #[tokio::test]
    async fn test_index_update_dry_run() {
        let mut server = Server::new_async().await;
        let temp_dir = create_test_dir();
        let _mocks = setup(&mut server, &temp_dir).await;

        let result = run_brewup(temp_dir.path(), &["--dry-run"]).await;
        assert_eq!(result.summary.total_updates(), 1);
        assert_eq!(fs::read_to_string(temp_dir.path().join("go.rb")).unwrap(), GOLANG);
    }
}

mod directory_listing_workflow {
    use super::*;

    fn hadoop_formula(base: &str) -> String {
        format!(
            "class Hadoop2 < DebianFormula\n  homepage 'http://hadoop.apache.org/'\n  url '{base}/dist/hadoop/core/hadoop-2.6.0/hadoop-2.6.0.tar.gz'\n  sha1 '{HELLO_SHA1}'\n\n  version '2.6.0+thepwagner1'\nend\n"
        )
    }

    async fn mock_listing(server: &mut Server) -> Vec<Mock> {
        vec![
            server
                .mock("GET", "/dist/hadoop/core")
                .with_body(
                    r#"<html><body><pre>
<a href="../">../</a>
<a href="hadoop-2.6.0/">hadoop-2.6.0/</a>
<a href="hadoop-2.7.1/">hadoop-2.7.1/</a>
<a href="hadoop-3.0.0-alpha1/">hadoop-3.0.0-alpha1/</a>
</pre></body></html>"#,
                )
                .create_async()
                .await,
            server
                .mock("GET", "/dist/hadoop/core/hadoop-2.6.0/hadoop-2.6.0.tar.gz")
                .with_body("hello world")
                .create_async()
                .await,
            server
                .mock("GET", "/dist/hadoop/core/hadoop-2.7.1/hadoop-2.7.1.tar.gz")
                .with_body("hello world!")
                .create_async()
                .await,
        ]
    }

    /// Test that a listing update skips pre-releases and rehashes with sha1
    #[tokio::test]
    async fn test_listing_update_with_sha1() {
        let mut server = Server::new_async().await;
        let _mocks = mock_listing(&mut server).await;
        let temp_dir = create_test_dir();
        let formula = temp_dir.path().join("hadoop2.rb");
        fs::write(&formula, hadoop_formula(&server.url())).unwrap();

        let result = run_brewup(temp_dir.path(), &[]).await;
        assert!(!result.has_errors(), "{:?}", result.errors);

        let written = fs::read_to_string(&formula).unwrap();
        assert!(written.contains("hadoop-2.7.1/hadoop-2.7.1.tar.gz"));
        assert!(written.contains("version '2.7.1+thepwagner1'"));
        assert!(written.contains(HELLO_BANG_SHA1));
        assert!(!written.contains("alpha"));
    }

    /// Test that ignored paths are never fetched
    #[tokio::test]
    async fn test_ignored_formula_not_checked() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/dist/hadoop/core")
            .expect(0)
            .create_async()
            .await;
        let temp_dir = create_test_dir();
        fs::create_dir_all(temp_dir.path().join("legacy")).unwrap();
        fs::write(temp_dir.path().join("legacy/hadoop2.rb"), hadoop_formula(&server.url())).unwrap();

        let result = run_brewup(temp_dir.path(), &["--ignore", "legacy"]).await;
        assert_eq!(result.summary.files_processed(), 0);
        listing.assert_async().await;
    }
}
