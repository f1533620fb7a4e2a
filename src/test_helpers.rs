//! Shared test helpers for archive fixtures and waiting on searches.

use crate::controller::SearchController;
use crate::types::StatusSnapshot;
use std::path::Path;
use std::time::Duration;

/// Create a password-encrypted ZIP using the deprecated ZipCrypto method
/// (only encryption method supported for writing by zip 0.6)
pub(crate) fn create_encrypted_zip(archive_path: &Path, files: &[(&str, &[u8])], password: &[u8]) {
    use ::zip::unstable::write::FileOptionsExt;
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options = ::zip::write::FileOptions::default()
        .compression_method(::zip::CompressionMethod::Stored)
        .with_deprecated_encryption(password);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Poll `status()` until the job completes, panicking after `timeout`
pub(crate) async fn wait_for_completion(
    controller: &SearchController,
    timeout: Duration,
) -> StatusSnapshot {
    tokio::time::timeout(timeout, async {
        loop {
            let status = controller.status();
            if status.completed {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("search did not complete in time")
}

/// Poll `status()` until at least `attempts` candidates were tried
pub(crate) async fn wait_for_attempts(
    controller: &SearchController,
    attempts: u64,
    timeout: Duration,
) -> StatusSnapshot {
    tokio::time::timeout(timeout, async {
        loop {
            let status = controller.status();
            if status.attempts >= attempts || status.completed {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("search made no progress in time")
}
