//! Checksum reconciliation
//!
//! This module provides:
//! - Layered hash strategies per ecosystem
//! - The `first_found` combinator that runs strategies in order
//! - Signature verification of downloaded artifacts
//!
//! A strategy either finds the new digest, declares itself not applicable,
//! or fails. Non-fatal failures fall through to the next strategy; fatal
//! ones (signature mismatch, scratch file errors) stop reconciliation.

mod generic;
mod github;
mod golang;
mod signature;

pub use generic::{from_download, signature_url};
pub use github::{digest_from_manifest, MANIFEST_MAX_SIZE};
pub use golang::from_index;
pub use signature::{GpgVerifier, SignatureVerifier, PGP_SIGNATURE_MARKER};

use crate::domain::{Ecosystem, HashAlgorithm, Update};
use crate::error::{HashError, SourceError};
use crate::http::HttpClient;
use crate::source::{parse_repository, GitHubClient, GolangIndex, SourceConfig};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a single hash strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    /// The digest of the updated artifact
    Found(String),
    /// The strategy does not apply to this reference
    NotApplicable,
}

/// A named strategy waiting to run
pub type Strategy<'a> = (&'static str, BoxFuture<'a, Result<HashOutcome, HashError>>);

/// Runs strategies in order until one finds a digest
///
/// Futures are lazy, so later strategies never start once one succeeds.
pub async fn first_found(strategies: Vec<Strategy<'_>>) -> Result<Option<String>, HashError> {
    for (name, strategy) in strategies {
        match strategy.await {
            Ok(HashOutcome::Found(hash)) => {
                debug!(strategy = name, hash = %hash, "found updated hash");
                return Ok(Some(hash));
            }
            Ok(HashOutcome::NotApplicable) => {
                debug!(strategy = name, "strategy not applicable");
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(strategy = name, error = %e, "hash strategy failed");
            }
        }
    }
    Ok(None)
}

/// Finds the checksum of an updated artifact
#[derive(Clone)]
pub struct HashResolver {
    client: HttpClient,
    github: GitHubClient,
    golang: GolangIndex,
    verifier: Option<Arc<dyn SignatureVerifier>>,
}

impl HashResolver {
    /// Create a new hash resolver without signature verification
    pub fn new(client: HttpClient, config: &SourceConfig) -> Self {
        Self {
            github: config.github(client.clone()),
            golang: config.golang(client.clone()),
            client,
            verifier: None,
        }
    }

    /// Verify detached signatures of downloaded artifacts when published
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Returns the digest of `update.next` matching `previous_digest`
    ///
    /// Returns `Ok(None)` when the digest length fits no known algorithm or
    /// when every strategy came up empty.
    pub async fn resolve(&self, update: &Update, previous_digest: &str) -> Result<Option<String>, HashError> {
        let Some(algorithm) = HashAlgorithm::from_hex(previous_digest) else {
            debug!(digest = previous_digest, "unrecognized digest length, skipping hash update");
            return Ok(None);
        };
        if algorithm == HashAlgorithm::Sha1 {
            warn!(path = %update.path, "consider upgrading formula from sha1");
        }
        let previous = previous_digest.to_ascii_lowercase();

        match Ecosystem::classify(&update.path) {
            Ecosystem::TagRelease => self.resolve_release(update, &previous, algorithm).await,
            Ecosystem::DirectoryListing => {
                first_found(vec![("download", self.download(update, &previous, algorithm).boxed())]).await
            }
            Ecosystem::IndexFile => {
                first_found(vec![
                    ("index", self.index(update, &previous).boxed()),
                    ("download", self.download(update, &previous, algorithm).boxed()),
                ])
                .await
            }
        }
    }

    async fn resolve_release(
        &self,
        update: &Update,
        previous: &str,
        algorithm: HashAlgorithm,
    ) -> Result<Option<String>, HashError> {
        let (owner, repo) = parse_repository(&update.path).map_err(SourceError::from)?;
        let release = self.github.release_by_tag(&owner, &repo, &update.previous).await?;

        first_found(vec![
            (
                "checksum manifest",
                github::from_manifest(&self.client, &release, update, previous, algorithm).boxed(),
            ),
            (
                "release asset",
                github::from_assets(&self.client, &release, update, previous, algorithm).boxed(),
            ),
            (
                "source archive",
                github::from_archives(&self.client, &release, update, previous, algorithm).boxed(),
            ),
        ])
        .await
    }

    async fn download(&self, update: &Update, previous: &str, algorithm: HashAlgorithm) -> Result<HashOutcome, HashError> {
        generic::from_download(&self.client, self.verifier.as_deref(), update, previous, algorithm).await
    }

    async fn index(&self, update: &Update, previous: &str) -> Result<HashOutcome, HashError> {
        golang::from_index(&self.golang, update, previous).await
    }
}
