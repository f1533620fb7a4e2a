use crate::error::{ArchiveError, Error, Result};
use crate::types::ArchiveType;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use super::{ArchiveReader, discard_partial, open_archive};

/// Local file header and empty-archive end-of-central-directory signatures
const ZIP_SIGNATURES: [&[u8]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

/// Archive reader for ZIP files
///
/// Decrypts both WinZip AES and legacy ZipCrypto entries.
pub struct ZipReader;

impl ZipReader {
    /// Open a ZIP entry by index, decrypting with `password` when it is encrypted
    ///
    /// `Ok(None)` means the password was rejected.
    fn open_zip_entry<'a>(
        archive: &'a mut ::zip::ZipArchive<std::fs::File>,
        index: usize,
        password: &str,
        archive_path: &Path,
    ) -> Result<Option<::zip::read::ZipFile<'a>>> {
        let failed = |e: ::zip::result::ZipError| {
            Error::Archive(ArchiveError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read ZIP entry: {}", e),
            })
        };

        if password.is_empty() {
            return archive.by_index(index).map(Some).map_err(failed);
        }

        match archive.by_index_decrypt(index, password.as_bytes()) {
            Ok(Ok(file)) => Ok(Some(file)),
            Ok(Err(_invalid_password)) => Ok(None),
            Err(e) => Err(failed(e)),
        }
    }

    /// Extract a single ZIP entry to disk, creating directories as needed
    fn extract_zip_entry(
        mut file: ::zip::read::ZipFile,
        dest_path: &Path,
        archive_path: &Path,
    ) -> Result<Option<PathBuf>> {
        let file_path = match file.enclosed_name() {
            Some(path) => dest_path.join(path),
            None => {
                warn!(entry = file.name(), "skipping entry with unsafe path");
                return Ok(None);
            }
        };

        if file.is_dir() {
            std::fs::create_dir_all(&file_path)?;
            return Ok(None);
        }

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = std::fs::File::create(&file_path)?;
        std::io::copy(&mut file, &mut outfile).map_err(|e| {
            Error::Archive(ArchiveError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to extract {}: {}", file_path.display(), e),
            })
        })?;

        Ok(Some(file_path))
    }

    fn write_archive(source_dir: &Path, output: &Path) -> std::result::Result<(), String> {
        let file = std::fs::File::create(output).map_err(|e| e.to_string())?;
        let mut writer = ::zip::ZipWriter::new(file);
        let options = ::zip::write::FileOptions::default()
            .compression_method(::zip::CompressionMethod::Deflated);

        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| e.to_string())?;
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .map_err(|e| e.to_string())?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                writer
                    .add_directory(name, options)
                    .map_err(|e| e.to_string())?;
            } else if entry.file_type().is_file() {
                writer.start_file(name, options).map_err(|e| e.to_string())?;
                let mut source = std::fs::File::open(entry.path()).map_err(|e| e.to_string())?;
                std::io::copy(&mut source, &mut writer).map_err(|e| e.to_string())?;
            }
        }

        writer.finish().map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl ArchiveReader for ZipReader {
    fn kind(&self) -> ArchiveType {
        ArchiveType::Zip
    }

    fn recognizes(&self, signature: &[u8]) -> bool {
        ZIP_SIGNATURES.iter().any(|magic| signature.starts_with(magic))
    }

    fn probe(&self, archive_path: &Path, password: &str) -> Result<bool> {
        let file = open_archive(archive_path)?;

        let mut archive = match ::zip::ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(e) => {
                trace!(?archive_path, error = %e, "not readable as ZIP");
                return Ok(false);
            }
        };

        // The first file entry is read to its end so its checksum is verified;
        // ZipCrypto's one-byte header check alone admits false positives.
        for index in 0..archive.len() {
            let mut entry = match Self::open_zip_entry(&mut archive, index, password, archive_path)
            {
                Ok(Some(entry)) => entry,
                Ok(None) | Err(_) => return Ok(false),
            };
            if entry.is_dir() {
                continue;
            }
            let mut buf = [0u8; 8192];
            loop {
                match entry.read(&mut buf) {
                    Ok(0) => return Ok(true),
                    Ok(_) => {}
                    Err(_) => return Ok(false),
                }
            }
        }

        // No file entries: nothing to verify a password against
        Ok(false)
    }

    fn extract(&self, archive_path: &Path, password: &str, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "extracting ZIP archive");

        std::fs::create_dir_all(dest_path)?;

        let file = open_archive(archive_path)?;
        let mut archive = ::zip::ZipArchive::new(file).map_err(|e| {
            Error::Archive(ArchiveError::ExtractionFailed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read ZIP archive: {}", e),
            })
        })?;

        let mut extracted_files = Vec::new();

        for i in 0..archive.len() {
            let file = Self::open_zip_entry(&mut archive, i, password, archive_path)?
                .ok_or_else(|| {
                    Error::Archive(ArchiveError::ExtractionFailed {
                        archive: archive_path.to_path_buf(),
                        reason: format!("password rejected for entry {}", i),
                    })
                })?;

            if let Some(file_path) = Self::extract_zip_entry(file, dest_path, archive_path)? {
                extracted_files.push(file_path);
            }
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "ZIP extraction successful"
        );

        Ok(extracted_files)
    }

    fn pack(&self, source_dir: &Path, output: &Path) -> Result<()> {
        Self::write_archive(source_dir, output).map_err(|reason| {
            discard_partial(output);
            Error::Archive(ArchiveError::RepackFailed {
                artifact: output.to_path_buf(),
                reason,
            })
        })
    }
}
