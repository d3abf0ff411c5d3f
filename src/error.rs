//! Application error types using thiserror
//!
//! Error hierarchy:
//! - FormulaError: Issues reading, discovering or writing formula files
//! - SourceError: Issues with upstream version sources (release API, listings, indexes)
//! - ReferenceError: Dependency URLs that fit no supported addressing convention
//! - HashError: Checksum reconciliation failures
//! - ConfigError: Issues with CLI or settings file configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Formula file related errors
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Upstream source related errors
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Checksum reconciliation errors
    #[error(transparent)]
    Hash(#[from] HashError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to formula file operations
#[derive(Error, Debug)]
pub enum FormulaError {
    /// Root directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read formula file
    #[error("failed to read formula {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write formula file
    #[error("failed to write formula {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to walk a directory while discovering formulae
    #[error("failed to list directory {path}: {source}")]
    WalkError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a dependency reference that no source can address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// The reference is not a parseable URL
    #[error("invalid URL '{path}': {message}")]
    InvalidUrl { path: String, message: String },

    /// No path segment carries the current version
    #[error("could not find version {version} in URL {path}")]
    VersionNotInPath { path: String, version: String },

    /// The version-bearing segment has no dotted numeric run to match against
    #[error("segment '{segment}' of {path} has no numeric version to match")]
    NoVersionPattern { path: String, segment: String },

    /// Tag-release references need an owner and a repository name
    #[error("could not find owner and repository in {path}")]
    NotARepository { path: String },
}

/// Errors related to upstream version sources
#[derive(Error, Debug)]
pub enum SourceError {
    /// Resource not found upstream
    #[error("'{resource}' not found on {origin}")]
    NotFound { resource: String, origin: String },

    /// Network request failed
    #[error("failed to fetch '{resource}' from {origin}: {message}")]
    Network {
        resource: String,
        origin: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {origin}")]
    RateLimited { origin: String },

    /// Invalid response from upstream
    #[error("invalid response from {origin} for '{resource}': {message}")]
    InvalidResponse {
        resource: String,
        origin: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{resource}' from {origin}")]
    Timeout { resource: String, origin: String },

    /// The dependency reference cannot be addressed by this source
    #[error(transparent)]
    MalformedReference(#[from] ReferenceError),
}

/// Errors raised while reconciling a checksum
#[derive(Error, Debug)]
pub enum HashError {
    /// A fetch failed inside a hash strategy
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The updated artifact did not pass signature verification
    #[error("signature verification failed for {artifact}: {message}")]
    Signature { artifact: String, message: String },

    /// Scratch file handling for signature verification failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hash resolution exceeded its time budget
    #[error("hash resolution timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the settings file
    #[error("failed to read settings file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for the expected schema
    #[error("failed to parse settings file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },

    /// HTTP client could not be constructed
    #[error("failed to create HTTP client: {message}")]
    HttpClient { message: String },
}

impl FormulaError {
    /// Creates a new DirectoryNotFound error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        FormulaError::DirectoryNotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FormulaError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FormulaError::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl ReferenceError {
    /// Creates a new InvalidUrl error
    pub fn invalid_url(path: impl Into<String>, message: impl Into<String>) -> Self {
        ReferenceError::InvalidUrl {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new VersionNotInPath error
    pub fn version_not_in_path(path: impl Into<String>, version: impl Into<String>) -> Self {
        ReferenceError::VersionNotInPath {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl SourceError {
    /// Creates a new NotFound error
    pub fn not_found(resource: impl Into<String>, origin: impl Into<String>) -> Self {
        SourceError::NotFound {
            resource: resource.into(),
            origin: origin.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(
        resource: impl Into<String>,
        origin: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::Network {
            resource: resource.into(),
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        resource: impl Into<String>,
        origin: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SourceError::InvalidResponse {
            resource: resource.into(),
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(resource: impl Into<String>, origin: impl Into<String>) -> Self {
        SourceError::Timeout {
            resource: resource.into(),
            origin: origin.into(),
        }
    }

    /// Returns true if the upstream reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
    }
}

impl HashError {
    /// Creates a new Signature error
    pub fn signature(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        HashError::Signature {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HashError::Io {
            path: path.into(),
            source,
        }
    }

    /// Fatal errors stop the layered strategy instead of falling through
    pub fn is_fatal(&self) -> bool {
        matches!(self, HashError::Signature { .. } | HashError::Io { .. })
    }
}
