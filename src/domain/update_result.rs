//! Update decision result types

use super::{Dependency, Update};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency update was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No candidate compares greater than the current version
    AlreadyLatest,
    /// The current version has no comparable form
    UnparseableVersion,
    /// Listing candidates failed
    CheckFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::UnparseableVersion => write!(f, "version is not comparable"),
            SkipReason::CheckFailed(msg) => write!(f, "check failed: {}", msg),
        }
    }
}

/// What happened to the formula's checksum when applying an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HashStatus {
    /// The checksum was replaced
    Updated { previous: String, next: String },
    /// The formula does not carry exactly one recognizable checksum
    NotApplicable,
    /// Every strategy ran without finding the new checksum
    NotFound { previous: String },
    /// Reconciliation failed; the old checksum was kept
    Failed { previous: String, message: String },
}

impl HashStatus {
    /// Returns true if the formula still carries a checksum for the old version
    pub fn is_stale(&self) -> bool {
        matches!(self, HashStatus::NotFound { .. } | HashStatus::Failed { .. })
    }
}

impl fmt::Display for HashStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashStatus::Updated { .. } => write!(f, "checksum updated"),
            HashStatus::NotApplicable => write!(f, "no checksum"),
            HashStatus::NotFound { .. } => write!(f, "checksum not found"),
            HashStatus::Failed { message, .. } => write!(f, "checksum failed: {}", message),
        }
    }
}

/// Result of an update decision for a single dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// Dependency will be updated
    Update {
        /// The dependency being updated
        dependency: Dependency,
        /// The resolved update
        update: Update,
        /// Outcome of checksum reconciliation
        hash: HashStatus,
    },
    /// Dependency update was skipped
    Skip {
        /// The dependency that was skipped
        dependency: Dependency,
        /// The reason for skipping
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates an Update result
    pub fn update(dependency: Dependency, update: Update, hash: HashStatus) -> Self {
        UpdateResult::Update {
            dependency,
            update,
            hash,
        }
    }

    /// Creates a Skip result
    pub fn skip(dependency: Dependency, reason: SkipReason) -> Self {
        UpdateResult::Skip { dependency, reason }
    }

    /// Creates a Skip result for already at latest
    pub fn skip_already_latest(dependency: Dependency) -> Self {
        Self::skip(dependency, SkipReason::AlreadyLatest)
    }

    /// Creates a Skip result for check failure
    pub fn skip_check_failed(dependency: Dependency, message: impl Into<String>) -> Self {
        Self::skip(dependency, SkipReason::CheckFailed(message.into()))
    }

    /// Returns true if this is an update result
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateResult::Update { .. })
    }

    /// Returns true if this is a skip result
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skip { .. })
    }

    /// Returns the dependency reference
    pub fn dependency(&self) -> &Dependency {
        match self {
            UpdateResult::Update { dependency, .. } => dependency,
            UpdateResult::Skip { dependency, .. } => dependency,
        }
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Update { update, hash, .. } => {
                write!(f, "{} ({})", update, hash)
            }
            UpdateResult::Skip { dependency, reason } => {
                write!(f, "{}: skipped ({})", dependency.version, reason)
            }
        }
    }
}
