//! Update resolution
//!
//! Wires the ecosystem classifier, the matching version source and the
//! version comparator into a single upgrade decision per dependency.

use crate::domain::{Dependency, Ecosystem, Update};
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::source::{create_source, SourceConfig};
use crate::version;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Resolves the next version of a dependency
#[derive(Clone)]
pub struct UpdateResolver {
    client: HttpClient,
    config: SourceConfig,
}

impl UpdateResolver {
    /// Create a new resolver
    pub fn new(client: HttpClient, config: SourceConfig) -> Self {
        Self { client, config }
    }

    /// Returns the update for `dependency`, or None when it is current
    ///
    /// A current version without a canonical form cannot be compared and
    /// is reported as no update.
    pub async fn resolve(&self, dependency: &Dependency) -> Result<Option<Update>, SourceError> {
        if version::normalize(&dependency.version).is_none() {
            warn!(version = %dependency.version, path = %dependency.path, "could not parse current version");
            return Ok(None);
        }

        let ecosystem = Ecosystem::classify(&dependency.path);
        let source = create_source(ecosystem, self.client.clone(), &self.config);
        let candidates = source.list_candidates(dependency).await?;
        debug!(
            path = %dependency.path,
            source = source.source_name(),
            candidates = candidates.len(),
            "listed candidates"
        );

        Ok(select_update(ecosystem, dependency, &candidates))
    }
}

/// Picks the first candidate strictly greater than the current version
///
/// Candidates are scanned in source order and those without a canonical
/// form are skipped. Release tags arrive newest first, so meeting an older
/// tag ends the scan.
pub fn select_update(ecosystem: Ecosystem, dependency: &Dependency, candidates: &[String]) -> Option<Update> {
    let current = version::normalize(&dependency.version)?;
    for candidate in candidates {
        let Some(parsed) = version::normalize(candidate) else {
            continue;
        };
        match version::compare(&parsed, &current) {
            Ordering::Greater => return Some(Update::from_candidate(dependency, candidate)),
            Ordering::Less if ecosystem == Ecosystem::TagRelease => return None,
            _ => {}
        }
    }
    None
}
