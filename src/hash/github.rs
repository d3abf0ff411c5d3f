//! Hash strategies for GitHub releases
//!
//! All three strategies start from the release the formula currently
//! points at and look for the file whose digest is the recorded one:
//! - a small checksum manifest listing that digest
//! - a release asset hashing to that digest
//! - a generated source archive hashing to that digest
//!
//! The matching file of the new release then yields the new digest.

use super::HashOutcome;
use crate::domain::{ChecksumManifestEntry, HashAlgorithm, Update};
use crate::error::HashError;
use crate::http::HttpClient;
use crate::source::Release;
use crate::template::updated_url;
use tracing::{debug, warn};

/// Largest asset inspected as a possible checksum manifest, in bytes
pub const MANIFEST_MAX_SIZE: u64 = 1024;

/// Reads the new digest out of a manifest that listed the previous one
///
/// A single-line manifest describes a single file, so its first token is
/// the answer. Otherwise the file name recorded next to `previous` is
/// looked up in the new manifest.
pub fn digest_from_manifest(old: &str, new: &str, previous: &str) -> Option<String> {
    let old_lines: Vec<&str> = old.lines().filter(|l| !l.trim().is_empty()).collect();
    if old_lines.len() == 1 {
        return new.split_whitespace().next().map(str::to_ascii_lowercase);
    }

    let filename = old_lines
        .iter()
        .filter_map(|l| ChecksumManifestEntry::parse(l))
        .find(|e| e.digest.eq_ignore_ascii_case(previous))?
        .filename;
    debug!(filename = %filename, "identified hashed file in checksum manifest");

    new.lines()
        .filter_map(ChecksumManifestEntry::parse)
        .find(|e| e.filename == filename)
        .map(|e| e.digest.to_ascii_lowercase())
}

/// Looks for a checksum manifest among the small assets of the release
pub(super) async fn from_manifest(
    client: &HttpClient,
    release: &Release,
    update: &Update,
    previous: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    for asset in release.assets.iter().filter(|a| a.size <= MANIFEST_MAX_SIZE) {
        let old = match client.get_text(&asset.browser_download_url, "release asset").await {
            Ok(text) => text,
            Err(e) => {
                warn!(name = %asset.name, error = %e, "inspecting potential checksum manifest");
                continue;
            }
        };
        if !old.to_ascii_lowercase().contains(previous) {
            debug!(name = %asset.name, "asset does not list the previous hash");
            continue;
        }
        debug!(name = %asset.name, "identified checksum manifest in previous release");

        let new_url = updated_url(&asset.browser_download_url, update);
        if new_url == asset.browser_download_url {
            debug!(name = %asset.name, "manifest URL does not carry the version");
            continue;
        }
        let new = match client.get_text(&new_url, "release asset").await {
            Ok(text) => text,
            Err(e) => {
                warn!(url = %new_url, error = %e, "fetching updated checksum manifest");
                continue;
            }
        };

        match digest_from_manifest(&old, &new, previous) {
            Some(digest) if algorithm.accepts(&digest) => return Ok(HashOutcome::Found(digest)),
            Some(digest) => {
                warn!(url = %new_url, digest = %digest, "manifest entry is not a {} digest", algorithm);
            }
            None => debug!(url = %new_url, "updated manifest does not list the file"),
        }
    }
    Ok(HashOutcome::NotApplicable)
}

/// Hashes every release asset looking for the previous digest
pub(super) async fn from_assets(
    client: &HttpClient,
    release: &Release,
    update: &Update,
    previous: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    let urls: Vec<&str> = release
        .assets
        .iter()
        .map(|a| a.browser_download_url.as_str())
        .collect();
    rehash_matching(client, &urls, update, previous, algorithm).await
}

/// Hashes the generated source archives looking for the previous digest
pub(super) async fn from_archives(
    client: &HttpClient,
    release: &Release,
    update: &Update,
    previous: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    let urls = release.source_urls();
    let urls: Vec<&str> = urls.iter().map(String::as_str).collect();
    rehash_matching(client, &urls, update, previous, algorithm).await
}

/// Finds the URL hashing to `previous` and hashes its updated counterpart
async fn rehash_matching(
    client: &HttpClient,
    urls: &[&str],
    update: &Update,
    previous: &str,
    algorithm: HashAlgorithm,
) -> Result<HashOutcome, HashError> {
    for url in urls {
        match client.digest(url, algorithm).await {
            Ok(hash) if hash == previous => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(url, error = %e, "checking hash of previous release file");
                continue;
            }
        }
        debug!(url, "identified hashed file in previous release");

        let new_url = updated_url(url, update);
        if new_url == *url {
            return Ok(HashOutcome::NotApplicable);
        }
        let hash = client.digest(&new_url, algorithm).await?;
        debug!(url = %new_url, hash = %hash, "downloaded updated file");
        return Ok(HashOutcome::Found(hash));
    }
    Ok(HashOutcome::NotApplicable)
}
