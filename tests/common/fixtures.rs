//! Protected archive fixtures built on the fly

use std::io::{Read, Write};
use std::path::Path;
use zip::unstable::write::FileOptionsExt;

/// Files placed in every fixture archive
pub const FIXTURE_FILES: &[(&str, &[u8])] = &[
    ("readme.txt", b"keysearch fixture"),
    ("data/numbers.csv", b"1,2,3\n4,5,6\n"),
];

/// WinZip AES-256 (AE-2) protected ZIP whose password is "3"
///
/// zip 0.6 cannot write AES entries, so this one is checked in.
pub const AES_ZIP: &[u8] = include_bytes!("../fixtures/aes256.zip");

/// Entries stored in [`AES_ZIP`]
pub const AES_ZIP_FILES: &[(&str, &[u8])] = &[
    ("alpha.txt", b"winzip aes fixture\n"),
    (
        "beta.txt",
        b"second entry, long enough to span more than one AES block of counter mode\n",
    ),
];

/// Write a ZipCrypto-protected ZIP containing `files`
pub fn create_protected_zip(path: &Path, files: &[(&str, &[u8])], password: &str) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .with_deprecated_encryption(password.as_bytes());
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

/// Write an AES-256 protected 7z archive containing `files`
pub fn create_protected_7z(path: &Path, files: &[(&str, &[u8])], password: &str) {
    let source = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let target = source.path().join(name);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, content).unwrap();
    }
    sevenz_rust::compress_to_path_encrypted(source.path(), path, password.into()).unwrap();
}

/// Read every file entry of an unprotected ZIP, sorted by name
pub fn read_unprotected_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.push((entry.name().to_string(), content));
    }
    entries.sort();
    entries
}

/// Fixture files as owned, sorted (name, content) pairs
pub fn expected_entries(files: &[(&str, &[u8])]) -> Vec<(String, Vec<u8>)> {
    let mut entries: Vec<(String, Vec<u8>)> = files
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_vec()))
        .collect();
    entries.sort();
    entries
}
