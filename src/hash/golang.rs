//! Hash strategy backed by the Go release index
//!
//! The index publishes a SHA-256 for every file, so nothing is downloaded:
//! the recorded digest identifies the file name in the historical index,
//! and the same file of the new release is looked up in the current one.

use super::HashOutcome;
use crate::domain::{HashAlgorithm, Update};
use crate::error::HashError;
use crate::source::{file_digest, historic_filename, GolangIndex};
use tracing::debug;

/// Looks up the new digest in the published index
pub async fn from_index(index: &GolangIndex, update: &Update, previous: &str) -> Result<HashOutcome, HashError> {
    if !HashAlgorithm::Sha256.accepts(previous) {
        return Ok(HashOutcome::NotApplicable);
    }

    let history = index.fetch_history().await?;
    let Some(historic) = historic_filename(&history, previous) else {
        debug!(hash = previous, "previous hash not found in release history");
        return Ok(HashOutcome::NotApplicable);
    };
    debug!(historic, "found old hash on artifact");

    let target = historic.replace(&update.previous, &update.next);
    if target == historic {
        return Ok(HashOutcome::NotApplicable);
    }

    let current = index.fetch_current().await?;
    match file_digest(&current, &update.next, &target) {
        Some(digest) if HashAlgorithm::Sha256.accepts(digest) => {
            debug!(updated = %target, "found updated file, updating hash");
            Ok(HashOutcome::Found(digest.to_ascii_lowercase()))
        }
        _ => {
            debug!(updated = %target, version = %update.next, "updated file not in current index");
            Ok(HashOutcome::NotApplicable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use mockito::Server;

    const OLD: &str = "3918e6cc85e7eaaa6f859f1bdbaac772e7a825b0eb423c63d3ae68b21f84b844";
    const NEW: &str = "d3379c32a90fdf9382166f8f48034c459a8cc433730bc9476d39d9082c94583b";

    async fn index_for(server: &mut Server) -> (GolangIndex, Vec<mockito::Mock>) {
        let history = format!(
            r#"[{{"version":"go1.15.6","files":[
                {{"filename":"go1.15.6.darwin-amd64.tar.gz","sha256":"{}"}},
                {{"filename":"go1.15.6.linux-amd64.tar.gz","sha256":"{}"}}
            ]}}]"#,
            "a".repeat(64),
            OLD
        );
        let current = format!(
            r#"[{{"version":"go1.15.8","files":[
                {{"filename":"go1.15.8.darwin-amd64.tar.gz","sha256":"{}"}},
                {{"filename":"go1.15.8.linux-amd64.tar.gz","sha256":"{}"}}
            ]}}]"#,
            "b".repeat(64),
            NEW
        );
        let mocks = vec![
            server
                .mock("GET", "/releases.json")
                .with_body(history)
                .create_async()
                .await,
            server
                .mock("GET", "/dl/")
                .match_query(mockito::Matcher::Any)
                .with_body(current)
                .create_async()
                .await,
        ];
        let index = GolangIndex::new(
            HttpClient::new().unwrap(),
            &format!("{}/dl/?mode=json", server.url()),
            &format!("{}/releases.json", server.url()),
        );
        (index, mocks)
    }

    #[tokio::test]
    async fn test_from_index_finds_matching_platform() {
        let mut server = Server::new_async().await;
        let (index, _mocks) = index_for(&mut server).await;
        let update = Update::new("https://golang.org/dl/go#{VERSION}.linux-amd64.tar.gz", "1.15.6", "1.15.8");

        let outcome = from_index(&index, &update, OLD).await.unwrap();
        assert_eq!(outcome, HashOutcome::Found(NEW.to_string()));
    }

    #[tokio::test]
    async fn test_from_index_unknown_hash() {
        let mut server = Server::new_async().await;
        let (index, _mocks) = index_for(&mut server).await;
        let update = Update::new("https://golang.org/dl/go#{VERSION}.linux-amd64.tar.gz", "1.15.6", "1.15.8");

        let outcome = from_index(&index, &update, &"c".repeat(64)).await.unwrap();
        assert_eq!(outcome, HashOutcome::NotApplicable);
    }

    #[tokio::test]
    async fn test_from_index_skips_non_sha256() {
        let index = GolangIndex::new(HttpClient::new().unwrap(), "http://127.0.0.1:1/dl", "http://127.0.0.1:1/h");
        let update = Update::new("https://golang.org/dl/go#{VERSION}.src.tar.gz", "1.15.6", "1.15.8");

        let outcome = from_index(&index, &update, &"a".repeat(40)).await.unwrap();
        assert_eq!(outcome, HashOutcome::NotApplicable);
    }
}
