//! Candidate verification strategies
//!
//! A [`Verifier`] is built once per job from its [`JobConfig`] and then asked
//! about each candidate. A mismatch is the normal outcome and is reported as
//! `Ok(false)`; `Err` is reserved for failures of the verification
//! infrastructure itself (for archive mode, the archive becoming unreadable).

mod archive;
mod digest;

pub use archive::ArchiveVerifier;
pub use digest::DigestAlgorithm;

use crate::archive::ArchiveReader;
use crate::error::{ArchiveError, Result};
use crate::types::{JobConfig, Method};
use std::sync::Arc;

/// Verification strategy selected for one job
#[derive(Debug)]
pub enum Verifier {
    /// Verbatim comparison with the target
    Plain {
        /// Target value
        target: String,
    },
    /// Digest comparison; the target digest is computed once up front
    Digest {
        /// Hash function
        algorithm: DigestAlgorithm,
        /// Digest of the target value
        target_digest: Vec<u8>,
    },
    /// Archive password test
    Archive(ArchiveVerifier),
}

impl Verifier {
    /// Select and prepare the strategy for `config`
    ///
    /// Archive mode fails here when no archive path is configured, the
    /// archive cannot be read, or no reader supports its format.
    pub fn for_job(config: &JobConfig, readers: &[Arc<dyn ArchiveReader>]) -> Result<Self> {
        let verifier = match config.method {
            Method::Plain => Verifier::Plain {
                target: config.target.clone(),
            },
            Method::Md5 => Self::digest(DigestAlgorithm::Md5, &config.target),
            Method::Sha256 => Self::digest(DigestAlgorithm::Sha256, &config.target),
            Method::Archive => {
                let archive = config
                    .archive_path
                    .as_deref()
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or(ArchiveError::MissingArchivePath)?;
                Verifier::Archive(ArchiveVerifier::open(archive, readers)?)
            }
        };
        Ok(verifier)
    }

    fn digest(algorithm: DigestAlgorithm, target: &str) -> Self {
        Verifier::Digest {
            algorithm,
            target_digest: algorithm.digest(target.as_bytes()),
        }
    }

    /// Whether `candidate` matches
    pub fn check(&self, candidate: &str) -> Result<bool> {
        match self {
            Verifier::Plain { target } => Ok(candidate == target),
            Verifier::Digest {
                algorithm,
                target_digest,
            } => Ok(algorithm.digest(candidate.as_bytes()) == *target_digest),
            Verifier::Archive(archive) => archive.check(candidate),
        }
    }

    /// Whether `check` does blocking file I/O
    pub fn is_blocking(&self) -> bool {
        matches!(self, Verifier::Archive(_))
    }
}
