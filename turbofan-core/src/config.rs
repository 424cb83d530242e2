//! Configuration for dataset runs.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment. The CLI applies its own flags on top
//! of the extracted value.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DatasetError;
use crate::writer::ShuffleMode;

/// Location of the published C-MAPSS archive.
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://ti.arc.nasa.gov/m/project/prognostic-repository/CMAPSSData.zip";

/// Environment variable prefix (`TURBOFAN_DOWNLOAD__URL`, `TURBOFAN_OUTPUT__SEED`, ...).
pub const ENV_PREFIX: &str = "TURBOFAN_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurbofanConfig {
    /// Archive download settings.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Assembled CSV settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Archive download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// URL of the zip archive.
    #[serde(default = "default_url")]
    pub url: String,
    /// File name the archive is saved under inside the target directory.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Keep the archive on disk after extraction.
    #[serde(default = "default_true")]
    pub keep_archive: bool,
    /// Expected lowercase hex SHA-256 of the archive. Unchecked when absent.
    #[serde(default)]
    pub expected_sha256: Option<String>,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            archive_name: default_archive_name(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            keep_archive: true,
            expected_sha256: None,
            retry: RetryConfig::default(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_ARCHIVE_URL.to_string()
}

fn default_archive_name() -> String {
    "turbofanDataset.zip".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_connect_timeout_secs() -> u64 {
    30
}

/// Exponential backoff policy for downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Add up to 25% random jitter to each delay.
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
            jitter: true,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

/// Assembled CSV settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file name, written inside the target directory.
    #[serde(default = "default_output_file")]
    pub file_name: String,
    /// Randomize row order before writing.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Seed for a reproducible shuffle.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_output_file(),
            shuffle: true,
            seed: None,
        }
    }
}

impl OutputConfig {
    pub fn shuffle_mode(&self) -> ShuffleMode {
        match (self.shuffle, self.seed) {
            (false, _) => ShuffleMode::Preserve,
            (true, Some(seed)) => ShuffleMode::Seeded(seed),
            (true, None) => ShuffleMode::Random,
        }
    }
}

fn default_output_file() -> String {
    "assembledDataset.csv".to_string()
}

fn default_true() -> bool {
    true
}

/// Path of the user-level config file (`<config_dir>/config.toml`), if the
/// platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "turbofan", "turbofan")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Build the layered figment without extracting it.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `TURBOFAN_`, `__` for nesting)
/// 2. Explicit config file
/// 3. User config file
/// 4. Built-in defaults
pub fn figment(user_config: Option<&Path>, explicit: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(TurbofanConfig::default()));

    if let Some(path) = user_config {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from all layers.
///
/// An explicitly requested file must exist; `Toml::file` alone would skip it.
pub fn load_config(explicit: Option<&Path>) -> Result<TurbofanConfig, DatasetError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(DatasetError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
    }
    let user = user_config_path();
    Ok(figment(user.as_deref(), explicit).extract()?)
}
