//! Digest algorithms and checksum manifest entries

use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt;

/// Digest algorithm recorded in a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Infers the algorithm from the length of a hex digest
    ///
    /// Any other length means the digest cannot be reconciled.
    pub fn from_hex(digest: &str) -> Option<Self> {
        match digest.len() {
            40 => Some(HashAlgorithm::Sha1),
            64 => Some(HashAlgorithm::Sha256),
            128 => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Number of hex characters in a digest of this algorithm
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    /// Returns true if `candidate` looks like a digest of this algorithm
    pub fn accepts(&self, candidate: &str) -> bool {
        candidate.len() == self.hex_len() && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Creates a fresh hasher for this algorithm
    pub fn hasher(&self) -> Hasher {
        match self {
            HashAlgorithm::Sha1 => Hasher::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(sha2::Sha512::new()),
        }
    }

    /// Returns the keyword used in formulae
    pub fn keyword(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Incremental digest accumulator
pub enum Hasher {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
}

impl Hasher {
    /// Feeds a chunk of bytes into the digest
    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(chunk),
            Hasher::Sha256(h) => h.update(chunk),
            Hasher::Sha512(h) => h.update(chunk),
        }
    }

    /// Consumes the hasher and returns the lowercase hex digest
    pub fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha1(h) => format!("{:x}", h.finalize()),
            Hasher::Sha256(h) => format!("{:x}", h.finalize()),
            Hasher::Sha512(h) => format!("{:x}", h.finalize()),
        }
    }
}

/// One `<hex> <filename>` line of a checksum manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumManifestEntry {
    pub digest: String,
    pub filename: String,
}

impl ChecksumManifestEntry {
    /// Parses a manifest line, returning None for lines without a filename
    ///
    /// Both the `sha256sum` text (`hex  name`) and binary (`hex *name`)
    /// layouts are accepted.
    pub fn parse(line: &str) -> Option<Self> {
        let (digest, rest) = line.trim_end().split_once(' ')?;
        let filename = rest.trim_start_matches([' ', '*']);
        if digest.is_empty() || filename.is_empty() {
            return None;
        }
        Some(Self {
            digest: digest.to_string(),
            filename: filename.to_string(),
        })
    }
}
