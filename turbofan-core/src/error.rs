//! Error types for the turbofan-core crate.
//!
//! One `thiserror` enum covers every stage of a run. Variants carry the
//! offending path or file name so a failure can be traced back to its input.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for acquisition, assembly and writing.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Target directory already exists: {path} (rerun with --overwrite or choose another path)")]
    TargetExists { path: PathBuf },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Download of {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Download timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Archive checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Required file is missing: {path}")]
    MissingFile { path: PathBuf },

    #[error("Schema error in {file} at line {line}: {message}")]
    Schema {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Parse error in {file} at line {line}, column '{column}': cannot read '{value}'")]
    Parse {
        file: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("Ground truth in {file} does not line up with its engines: expected {expected} entries, found {found}")]
    GroundTruthMismatch {
        file: String,
        expected: usize,
        found: usize,
    },

    #[error("Arithmetic overflow in {file}: {message}")]
    Overflow { file: String, message: String },

    #[error("The {partition} partition is empty")]
    EmptyPartition { partition: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DatasetError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    pub fn schema(file: impl Into<String>, line: u64, msg: impl Into<String>) -> Self {
        Self::Schema {
            file: file.into(),
            line,
            message: msg.into(),
        }
    }

    pub fn overflow(file: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Overflow {
            file: file.into(),
            message: msg.into(),
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Connection failures, timeouts, interrupted bodies, throttling and
    /// server-side statuses are transient. Everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<figment::Error> for DatasetError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<zip::result::ZipError> for DatasetError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::archive(err.to_string())
    }
}
