//! Core domain models for brewup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency references and resolved updates
//! - Ecosystem classification of reference URLs
//! - Digest algorithms and checksum manifest entries
//! - Update decision results
//! - Summary and result structures

mod dependency;
mod digest;
mod ecosystem;
mod summary;
mod update_result;

pub use dependency::{Dependency, Update};
pub use digest::{ChecksumManifestEntry, HashAlgorithm, Hasher};
pub use ecosystem::Ecosystem;
pub use summary::{FormulaUpdateResult, UpdateSummary};
pub use update_result::{HashStatus, SkipReason, UpdateResult};
