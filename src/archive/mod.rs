//! Protected archive handling
//!
//! Each supported container format has an [`ArchiveReader`] that can test a
//! password, extract with it, and write an unprotected copy. The verifier
//! tries readers as an ordered chain of providers and the recovery step reuses
//! whichever reader accepted the password.

mod recovery;
mod sevenz;
mod zip;


pub use recovery::{artifact_path_for, recover};
pub use sevenz::SevenZipReader;
pub use zip::ZipReader;

use crate::error::{ArchiveError, Result};
use crate::types::ArchiveType;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of leading bytes handed to [`ArchiveReader::recognizes`]
pub const SIGNATURE_LEN: usize = 8;

/// A password-capable reader for one archive format
///
/// `probe` answers "does this password open the archive?" and must treat every
/// decryption or decoding failure as `Ok(false)`. It returns `Err` only when
/// the archive file itself cannot be opened.
pub trait ArchiveReader: Send + Sync {
    /// Format handled by this reader
    fn kind(&self) -> ArchiveType;

    /// Whether the leading bytes of a file look like this format
    fn recognizes(&self, signature: &[u8]) -> bool;

    /// Test `password` by reading the first file entry to its end
    fn probe(&self, archive: &Path, password: &str) -> Result<bool>;

    /// Extract every entry into `dest`, returning the written files
    fn extract(&self, archive: &Path, password: &str, dest: &Path) -> Result<Vec<PathBuf>>;

    /// Package the contents of `source_dir` into an unprotected archive at `output`
    fn pack(&self, source_dir: &Path, output: &Path) -> Result<()>;
}

/// Built-in readers in provider order
pub fn default_readers() -> Vec<Arc<dyn ArchiveReader>> {
    vec![Arc::new(ZipReader), Arc::new(SevenZipReader)]
}

/// Read up to [`SIGNATURE_LEN`] leading bytes of `archive`
///
/// Fails with [`ArchiveError::Unreadable`] when the file cannot be opened,
/// which is the one archive condition that fails a job outright.
pub fn read_signature(archive: &Path) -> Result<Vec<u8>> {
    let unreadable = |e: std::io::Error| ArchiveError::Unreadable {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    };

    let file = std::fs::File::open(archive).map_err(unreadable)?;
    let mut signature = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64)
        .read_to_end(&mut signature)
        .map_err(unreadable)?;
    Ok(signature)
}

/// Detect archive type by file extension
pub fn detect_archive_type(path: &Path) -> Option<ArchiveType> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    match ext.as_str() {
        "zip" => Some(ArchiveType::Zip),
        "7z" => Some(ArchiveType::SevenZip),
        _ => None,
    }
}

/// Open `archive` for reading, mapping failure to [`ArchiveError::Unreadable`]
pub(crate) fn open_archive(archive: &Path) -> Result<std::fs::File> {
    std::fs::File::open(archive).map_err(|e| {
        ArchiveError::Unreadable {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Remove a partially written artifact, ignoring a missing file
pub(crate) fn discard_partial(output: &Path) {
    if let Err(e) = std::fs::remove_file(output)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(?output, error = %e, "failed to remove partial artifact");
    }
}
