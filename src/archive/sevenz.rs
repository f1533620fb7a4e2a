use crate::error::{ArchiveError, Error, Result};
use crate::types::ArchiveType;
use sevenz_rust::{Password, SevenZReader};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, trace, warn};

use super::{ArchiveReader, discard_partial, open_archive};

const SEVENZ_SIGNATURE: &[u8] = &[b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C];

/// Archive reader for 7z files (AES-256 protected)
pub struct SevenZipReader;

impl SevenZipReader {
    fn password(password: &str) -> Password {
        if password.is_empty() {
            Password::empty()
        } else {
            Password::from(password)
        }
    }

    /// Resolve an entry name below `dest_path`, or `None` when it would escape it
    fn enclosed_path(dest_path: &Path, name: &str) -> Option<PathBuf> {
        let name = name.replace('\\', "/");
        let relative = Path::new(&name);
        let enclosed = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        enclosed.then(|| dest_path.join(relative))
    }

    fn write_entry(target: &Path, data: &mut dyn Read) -> std::io::Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = std::fs::File::create(target)?;
        std::io::copy(data, &mut outfile)?;
        Ok(())
    }
}

impl ArchiveReader for SevenZipReader {
    fn kind(&self) -> ArchiveType {
        ArchiveType::SevenZip
    }

    fn recognizes(&self, signature: &[u8]) -> bool {
        signature.starts_with(SEVENZ_SIGNATURE)
    }

    fn probe(&self, archive_path: &Path, password: &str) -> Result<bool> {
        // Surfaces a missing or unreadable file as an error rather than a mismatch
        drop(open_archive(archive_path)?);

        // With encrypted headers a wrong password already fails here
        let mut reader = match SevenZReader::open(archive_path, Self::password(password)) {
            Ok(reader) => reader,
            Err(e) => {
                trace!(?archive_path, error = %e, "7z open rejected password");
                return Ok(false);
            }
        };

        let mut verified = false;
        let walked = reader.for_each_entries(|entry, data| {
            if entry.is_directory || !entry.has_stream {
                return Ok(true);
            }
            verified = std::io::copy(data, &mut std::io::sink()).is_ok();
            Ok(false)
        });

        Ok(walked.is_ok() && verified)
    }

    fn extract(&self, archive_path: &Path, password: &str, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "extracting 7z archive");

        std::fs::create_dir_all(dest_path)?;

        let failed = |reason: String| {
            Error::Archive(ArchiveError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason,
            })
        };

        drop(open_archive(archive_path)?);
        let mut reader = SevenZReader::open(archive_path, Self::password(password))
            .map_err(|e| failed(format!("failed to open 7z archive: {}", e)))?;

        // Entry names are checked before anything is written for them
        let mut extracted_files = Vec::new();
        let mut unsafe_entry = None;
        let mut write_error = None;
        let walked = reader.for_each_entries(|entry, data| {
            let Some(target) = Self::enclosed_path(dest_path, &entry.name) else {
                unsafe_entry = Some(entry.name.clone());
                return Ok(false);
            };
            let written = if entry.is_directory {
                std::fs::create_dir_all(&target)
            } else {
                Self::write_entry(&target, data)
            };
            match written {
                Ok(()) => {
                    if !entry.is_directory {
                        extracted_files.push(target);
                    }
                    Ok(true)
                }
                Err(e) => {
                    write_error = Some((target, e));
                    Ok(false)
                }
            }
        });

        if let Some(name) = unsafe_entry {
            warn!(?archive_path, entry = %name, "rejecting 7z entry with unsafe path");
            return Err(failed(format!(
                "path traversal detected: entry {:?} escapes the destination",
                name
            )));
        }
        if let Some((target, e)) = write_error {
            return Err(failed(format!("failed to extract {}: {}", target.display(), e)));
        }
        walked.map_err(|e| failed(format!("failed to extract 7z archive: {}", e)))?;

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "7z extraction successful"
        );
        Ok(extracted_files)
    }

    fn pack(&self, source_dir: &Path, output: &Path) -> Result<()> {
        sevenz_rust::compress_to_path(source_dir, output).map_err(|e| {
            discard_partial(output);
            Error::Archive(ArchiveError::RepackFailed {
                artifact: output.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }
}
