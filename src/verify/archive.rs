use crate::archive::{ArchiveReader, detect_archive_type, read_signature};
use crate::error::{ArchiveError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Tests candidates as the password of one protected archive
///
/// Holds the providers that can plausibly read the archive, in the order
/// they are tried. The first provider that accepts a password wins.
pub struct ArchiveVerifier {
    archive: PathBuf,
    providers: Vec<Arc<dyn ArchiveReader>>,
}

impl std::fmt::Debug for ArchiveVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveVerifier")
            .field("archive", &self.archive)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ArchiveVerifier {
    /// Check that `archive` is readable and pick the providers for it
    ///
    /// Providers are kept when their signature check accepts the file. If no
    /// signature matches, providers for the file extension are used instead.
    /// An unreadable file or an archive no provider can handle is an error.
    pub fn open(archive: &Path, readers: &[Arc<dyn ArchiveReader>]) -> Result<Self> {
        let signature = read_signature(archive)?;

        let mut providers: Vec<Arc<dyn ArchiveReader>> = readers
            .iter()
            .filter(|r| r.recognizes(&signature))
            .cloned()
            .collect();

        if providers.is_empty()
            && let Some(kind) = detect_archive_type(archive)
        {
            providers = readers
                .iter()
                .filter(|r| r.kind() == kind)
                .cloned()
                .collect();
        }

        if providers.is_empty() {
            return Err(ArchiveError::UnsupportedFormat {
                archive: archive.to_path_buf(),
            }
            .into());
        }

        debug!(
            ?archive,
            providers = ?providers.iter().map(|p| p.kind()).collect::<Vec<_>>(),
            "archive verifier ready"
        );

        Ok(Self {
            archive: archive.to_path_buf(),
            providers,
        })
    }

    /// Path of the archive under test
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// First provider that opens the archive with `candidate`
    ///
    /// Provider failures are mismatches. Only an archive that can no longer
    /// be opened at all produces an error.
    pub fn matching_reader(&self, candidate: &str) -> Result<Option<Arc<dyn ArchiveReader>>> {
        for provider in &self.providers {
            if provider.probe(&self.archive, candidate)? {
                return Ok(Some(provider.clone()));
            }
            trace!(kind = ?provider.kind(), "provider rejected candidate");
        }
        Ok(None)
    }

    /// Whether any provider opens the archive with `candidate`
    pub fn check(&self, candidate: &str) -> Result<bool> {
        Ok(self.matching_reader(candidate)?.is_some())
    }
}
