//! Download-and-hash strategy
//!
//! Works for any reference that can be materialized for both versions:
//! the old artifact must hash to the recorded digest before the new one is
//! trusted. When a verifier is configured and upstream publishes a detached
//! `.asc` signature, the new artifact is kept on disk long enough to verify it.

use super::signature::{SignatureVerifier, PGP_SIGNATURE_MARKER};
use super::HashOutcome;
use crate::domain::{HashAlgorithm, Update};
use crate::error::HashError;
use crate::http::HttpClient;
use crate::template::materialize;
use tracing::{debug, warn};

/// Where the detached signature of `artifact_url` is published
pub fn signature_url(artifact_url: &str) -> String {
    format!("{}.asc", artifact_url)
}

/// File name of the artifact inside the scratch directory
fn artifact_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "artifact",
    }
}

/// Hashes the new artifact once the old one is confirmed to match
pub async fn from_download(
    client: &HttpClient,
    verifier: Option<&dyn SignatureVerifier>,
    update: &Update,
    previous: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    let old_url = materialize(&update.path, &update.previous, &update.previous);
    let new_url = materialize(&update.path, &update.previous, &update.next);
    if new_url == old_url {
        debug!(url = %old_url, "reference does not vary with the version");
        return Ok(HashOutcome::NotApplicable);
    }

    let old_hash = client.digest(&old_url, algorithm).await?;
    if old_hash != previous {
        debug!(url = %old_url, hash = %old_hash, "previous artifact does not match recorded hash");
        return Ok(HashOutcome::NotApplicable);
    }

    let signature = match verifier {
        Some(_) => fetch_signature(client, &new_url).await,
        None => None,
    };

    match (verifier, signature) {
        (Some(verifier), Some(signature)) => {
            verified_digest(client, verifier, &new_url, &signature, algorithm).await
        }
        _ => {
            let hash = client.digest(&new_url, algorithm).await?;
            debug!(url = %new_url, hash = %hash, "downloaded updated asset");
            Ok(HashOutcome::Found(hash))
        }
    }
}

/// Fetches the detached signature, if upstream publishes one
async fn fetch_signature(client: &HttpClient, artifact_url: &str) -> Option<String> {
    let url = signature_url(artifact_url);
    match client.get_text(&url, "signature").await {
        Ok(body) if body.contains(PGP_SIGNATURE_MARKER) => Some(body),
        Ok(_) => {
            debug!(url = %url, "no signature file detected");
            None
        }
        Err(e) => {
            warn!(url = %url, error = %e, "error fetching updated signature, ignoring");
            None
        }
    }
}

/// Downloads the artifact next to its signature and verifies it
///
/// The scratch directory is removed when this returns or is cancelled.
async fn verified_digest(
    client: &HttpClient,
    verifier: &dyn SignatureVerifier,
    url: &str,
    signature: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    let scratch = tempfile::Builder::new()
        .prefix("signature-")
        .tempdir()
        .map_err(|e| HashError::io(std::env::temp_dir(), e))?;

    let artifact = artifact_name(url);
    let hash = client
        .digest_to_file(url, algorithm, &scratch.path().join(artifact))
        .await?;

    let signature_file = format!("{}.asc", artifact);
    let signature_path = scratch.path().join(&signature_file);
    tokio::fs::write(&signature_path, signature)
        .await
        .map_err(|e| HashError::io(&signature_path, e))?;

    verifier.verify(scratch.path(), &signature_file).await?;
    debug!(url, hash = %hash, "verified updated asset signature");
    Ok(HashOutcome::Found(hash))
}
