//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable connect and idle timeouts, and User-Agent
//! - Status code mapping onto `SourceError`
//! - Streaming downloads into a digest accumulator
//!
//! There is no retry loop: a failed fetch is reported immediately so the
//! caller (or the next hash strategy) decides what to do.

use crate::domain::HashAlgorithm;
use crate::error::{HashError, SourceError};
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Default connect and idle-read timeout for HTTP requests (30 seconds)
///
/// There is no total deadline per request: artifact downloads may run as
/// long as bytes keep arriving. The orchestrator bounds each check and each
/// hash resolution as a whole.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("brewup/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    ///
    /// `timeout` limits connecting and each wait for the next chunk of data.
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                SourceError::network(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { client })
    }

    /// Perform a GET request
    pub async fn get(&self, url: &str, origin: &str) -> Result<reqwest::Response, SourceError> {
        self.get_with_headers(url, origin, HeaderMap::new()).await
    }

    /// Perform a GET request with extra headers
    pub async fn get_with_headers(
        &self,
        url: &str,
        origin: &str,
        headers: HeaderMap,
    ) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| transport_error(e, url, origin))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::not_found(url, origin));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                origin: origin.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::network(url, origin, format!("HTTP {}", status)));
        }

        Ok(response)
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        origin: &str,
    ) -> Result<T, SourceError> {
        self.get(url, origin)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                SourceError::invalid_response(url, origin, format!("failed to parse JSON: {}", e))
            })
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(&self, url: &str, origin: &str) -> Result<String, SourceError> {
        self.get(url, origin)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(e, url, origin))
    }

    /// Download `url` and return its hex digest
    ///
    /// The body is streamed into the hasher and never held in memory.
    pub async fn digest(&self, url: &str, algorithm: HashAlgorithm) -> Result<String, SourceError> {
        let response = self.get(url, "download").await?;
        let mut hasher = algorithm.hasher();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(e, url, "download"))?;
            hasher.update(&chunk);
        }

        let hash = hasher.finalize_hex();
        debug!(url, hash = %hash, "downloaded asset");
        Ok(hash)
    }

    /// Download `url` into `dest` while computing its hex digest
    pub async fn digest_to_file(
        &self,
        url: &str,
        algorithm: HashAlgorithm,
        dest: &Path,
    ) -> Result<String, HashError> {
        let response = self.get(url, "download").await?;
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| HashError::io(dest, e))?;
        let mut hasher = algorithm.hasher();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(e, url, "download"))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| HashError::io(dest, e))?;
            hasher.update(&chunk);
        }
        file.flush().await.map_err(|e| HashError::io(dest, e))?;

        let hash = hasher.finalize_hex();
        debug!(url, hash = %hash, dest = %dest.display(), "downloaded asset to disk");
        Ok(hash)
    }
}

fn transport_error(e: reqwest::Error, url: &str, origin: &str) -> SourceError {
    if e.is_timeout() {
        SourceError::timeout(url, origin)
    } else {
        SourceError::network(url, origin, e.to_string())
    }
}
