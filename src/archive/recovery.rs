//! Post-match archive recovery
//!
//! Once a password is confirmed, the archive is extracted into a fresh
//! temporary directory and repackaged without protection. The temporary
//! directory is removed when recovery returns, successful or not.

use crate::error::{ArchiveError, Error, Result};
use crate::types::ArchiveType;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::ArchiveReader;

/// Artifact location for an output stem: `<stem>.<extension>`
///
/// The extension is appended, never substituted, so a stem such as
/// `unlocked_v1.2` keeps its dots.
pub fn artifact_path_for(output_stem: &Path, kind: ArchiveType) -> PathBuf {
    let mut name = OsString::from(output_stem.as_os_str());
    name.push(".");
    name.push(kind.extension());
    PathBuf::from(name)
}

/// Extract `archive` with `password` and write an unprotected copy next to `output_stem`
///
/// Returns the artifact path on success. Nothing is left in the temporary
/// area afterwards, and a half-written artifact is removed.
pub fn recover(
    reader: &dyn ArchiveReader,
    archive: &Path,
    password: &str,
    output_stem: &Path,
) -> Result<PathBuf> {
    let artifact = artifact_path_for(output_stem, reader.kind());

    if let Some(parent) = artifact.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Archive(ArchiveError::RepackFailed {
                artifact: artifact.clone(),
                reason: format!("failed to create artifact directory: {}", e),
            })
        })?;
    }

    let workdir = tempfile::Builder::new()
        .prefix("keysearch-recover-")
        .tempdir()
        .map_err(|e| {
            Error::Archive(ArchiveError::ExtractionFailed {
                archive: archive.to_path_buf(),
                reason: format!("failed to create temporary directory: {}", e),
            })
        })?;

    let files = reader.extract(archive, password, workdir.path())?;
    debug!(
        ?archive,
        workdir = ?workdir.path(),
        file_count = files.len(),
        "archive extracted for repackaging"
    );

    reader.pack(workdir.path(), &artifact)?;

    info!(?archive, ?artifact, "unprotected artifact written");
    Ok(artifact)
}
