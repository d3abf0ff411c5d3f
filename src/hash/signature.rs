//! Detached signature verification

use crate::error::HashError;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Marker identifying an ASCII-armored detached signature
pub const PGP_SIGNATURE_MARKER: &str = "-----BEGIN PGP SIGNATURE-----";

/// Verifies a detached signature next to the artifact it signs
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature`, a file name inside `dir`
    ///
    /// The signed artifact sits in the same directory under the
    /// signature's name minus its `.asc` extension.
    async fn verify(&self, dir: &Path, signature: &str) -> Result<(), HashError>;
}

/// Verifies signatures with the local `gpg` keyring
#[derive(Debug, Clone)]
pub struct GpgVerifier {
    program: String,
}

impl GpgVerifier {
    /// Create a verifier running `gpg` from PATH
    pub fn new() -> Self {
        Self::with_program("gpg")
    }

    /// Create a verifier running a specific executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GpgVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureVerifier for GpgVerifier {
    async fn verify(&self, dir: &Path, signature: &str) -> Result<(), HashError> {
        let output = Command::new(&self.program)
            .arg("--verify")
            .arg(signature)
            .current_dir(dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HashError::io(dir, e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(program = %self.program, signature, status = %output.status, stderr = %stderr.trim(), "ran signature verification");

        if output.status.success() {
            Ok(())
        } else {
            let message = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| output.status.to_string());
            Err(HashError::signature(signature.trim_end_matches(".asc"), message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpg_verifier_default_program() {
        assert_eq!(GpgVerifier::default().program, "gpg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verify_success_on_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = GpgVerifier::with_program("true");
        assert!(verifier.verify(dir.path(), "tool.tgz.asc").await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verify_failure_on_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = GpgVerifier::with_program("false");
        let result = verifier.verify(dir.path(), "tool.tgz.asc").await;
        match result {
            Err(HashError::Signature { artifact, .. }) => assert_eq!(artifact, "tool.tgz"),
            other => panic!("expected signature error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = GpgVerifier::with_program("brewup-no-such-gpg-binary");
        let result = verifier.verify(dir.path(), "tool.tgz.asc").await;
        assert!(matches!(result, Err(HashError::Io { .. })));
    }
}
