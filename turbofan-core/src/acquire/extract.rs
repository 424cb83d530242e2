//! Zip extraction.

use std::fs::File;
use std::path::Path;

use crate::error::DatasetError;

/// Extract every file member of `archive_path` into `output_dir` and return
/// the number of files written.
///
/// Members whose names would land outside `output_dir` (absolute paths or
/// `..` components) are skipped.
pub fn extract_archive(archive_path: &Path, output_dir: &Path) -> Result<usize, DatasetError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DatasetError::archive(format!("Invalid zip archive: {e}")))?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "Skipping archive member outside target directory");
            continue;
        };
        let out_path = output_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out).map_err(|e| {
            DatasetError::archive(format!("Failed to extract {}: {e}", entry.name()))
        })?;
        extracted += 1;
    }

    tracing::info!(files = extracted, archive = %archive_path.display(), "Extracted archive");
    Ok(extracted)
}
