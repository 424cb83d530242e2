//! Archive download with timeouts and bounded retry.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::config::{DownloadConfig, RetryConfig};
use crate::error::DatasetError;

/// A downloaded archive on disk.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the archive contents.
    pub sha256: String,
}

/// Downloads the dataset archive over HTTP.
pub struct ArchiveDownloader {
    client: reqwest::Client,
    config: DownloadConfig,
}

impl ArchiveDownloader {
    pub fn new(config: DownloadConfig) -> Result<Self, DatasetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Download the archive into `target_dir`, retrying transient failures.
    pub async fn download(&self, target_dir: &Path) -> Result<DownloadedArchive, DatasetError> {
        let target = target_dir.join(&self.config.archive_name);
        tracing::info!(
            url = %self.config.url,
            path = %target.display(),
            "Downloading dataset archive"
        );
        let archive = with_retry(&self.config.retry, || self.fetch_once(&target)).await?;
        tracing::info!(bytes = archive.bytes, sha256 = %archive.sha256, "Download complete");
        Ok(archive)
    }

    /// One attempt: stream the response body to `target`, hashing as it goes.
    async fn fetch_once(&self, target: &Path) -> Result<DownloadedArchive, DatasetError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                url: self.config.url.clone(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(target).await?;
        let mut hasher = Sha256::new();
        let mut bytes = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| match self.classify(e) {
                DatasetError::Http(e) => {
                    DatasetError::network(format!("Download interrupted: {e}"))
                }
                other => other,
            })?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(DownloadedArchive {
            path: target.to_path_buf(),
            bytes,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }

    fn classify(&self, err: reqwest::Error) -> DatasetError {
        if err.is_timeout() {
            DatasetError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else if err.is_connect() {
            DatasetError::network(format!("Connection to {} failed: {err}", self.config.url))
        } else {
            DatasetError::Http(err)
        }
    }
}

/// Compare an archive digest against the configured one, if any.
pub fn verify_checksum(actual: &str, expected: Option<&str>) -> Result<(), DatasetError> {
    match expected {
        Some(expected) if !expected.eq_ignore_ascii_case(actual) => {
            Err(DatasetError::ChecksumMismatch {
                expected: expected.to_lowercase(),
                actual: actual.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> Result<T, DatasetError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, DatasetError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if !e.is_transient() || attempt >= config.max_retries => return Err(e),
            Err(e) => {
                let backoff_ms = compute_backoff(config, attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = config.max_retries,
                    backoff_ms,
                    error = %e,
                    "Retrying download after transient error"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                attempt += 1;
            }
        }
    }
}

/// Exponential backoff capped at `max_backoff_ms`, plus up to 25% jitter.
fn compute_backoff(config: &RetryConfig, attempt: u32) -> u64 {
    let base = config.initial_backoff_ms as f64 * config.backoff_multiplier.powi(attempt as i32);
    let capped = base.min(config.max_backoff_ms as f64) as u64;
    if config.jitter {
        let jitter = (capped as f64 * rand::thread_rng().gen_range(0.0..0.25)) as u64;
        capped + jitter
    } else {
        capped
    }
}
