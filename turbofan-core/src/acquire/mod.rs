//! Dataset acquisition — target directory, download, extraction.

pub mod download;
pub mod extract;

pub use download::{ArchiveDownloader, DownloadedArchive, verify_checksum, with_retry};
pub use extract::extract_archive;

use std::path::{Path, PathBuf};

use crate::config::DownloadConfig;
use crate::error::DatasetError;

/// Result of a successful acquisition.
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Archive path, or `None` when it was removed after extraction.
    pub archive_path: Option<PathBuf>,
    pub archive_sha256: String,
    pub extracted_files: usize,
}

/// Create `path` as an empty directory.
///
/// Fails with [`DatasetError::TargetExists`] if something already exists
/// there, unless `overwrite` is set, in which case it is removed first.
pub fn prepare_target_dir(path: &Path, overwrite: bool) -> Result<(), DatasetError> {
    if path.exists() {
        if !overwrite {
            return Err(DatasetError::TargetExists {
                path: path.to_path_buf(),
            });
        }
        tracing::warn!(path = %path.display(), "Removing existing target directory");
        if path.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Prepare `target_dir`, download the archive into it and extract it there.
pub async fn acquire(
    config: &DownloadConfig,
    target_dir: &Path,
    overwrite: bool,
) -> Result<Acquisition, DatasetError> {
    prepare_target_dir(target_dir, overwrite)?;

    let downloader = ArchiveDownloader::new(config.clone())?;
    let archive = downloader.download(target_dir).await?;
    verify_checksum(&archive.sha256, config.expected_sha256.as_deref())?;

    let extracted_files = extract_archive(&archive.path, target_dir)?;

    let archive_path = if config.keep_archive {
        Some(archive.path)
    } else {
        std::fs::remove_file(&archive.path)?;
        tracing::debug!(path = %archive.path.display(), "Removed archive after extraction");
        None
    };

    Ok(Acquisition {
        archive_path,
        archive_sha256: archive.sha256,
        extracted_files,
    })
}
