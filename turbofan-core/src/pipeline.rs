//! End-to-end run: acquire, assemble, write.

use std::path::{Path, PathBuf};

use crate::acquire::{Acquisition, acquire};
use crate::assemble::{assemble_test, assemble_train, merge_partitions};
use crate::config::TurbofanConfig;
use crate::error::DatasetError;
use crate::writer::write_table;

/// Per-run options that come from the command line rather than config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target_dir: PathBuf,
    pub overwrite: bool,
    /// Assemble files already present in `target_dir` without downloading.
    pub skip_download: bool,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub acquisition: Option<Acquisition>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_engines: usize,
    pub test_engines: usize,
}

impl RunSummary {
    pub fn total_rows(&self) -> usize {
        self.train_rows + self.test_rows
    }
}

/// Run every stage in order. Any failure aborts the run.
pub async fn run(
    config: &TurbofanConfig,
    options: &RunOptions,
) -> Result<RunSummary, DatasetError> {
    let acquisition = if options.skip_download {
        tracing::info!(dir = %options.target_dir.display(), "Skipping download");
        None
    } else {
        Some(acquire(&config.download, &options.target_dir, options.overwrite).await?)
    };

    let output_path = options.target_dir.join(&config.output.file_name);
    let counts = assemble_and_write(config, &options.target_dir, &output_path)?;

    Ok(RunSummary {
        output_path,
        acquisition,
        train_rows: counts.train_rows,
        test_rows: counts.test_rows,
        train_engines: counts.train_engines,
        test_engines: counts.test_engines,
    })
}

struct PartitionCounts {
    train_rows: usize,
    test_rows: usize,
    train_engines: usize,
    test_engines: usize,
}

/// Assemble `data_dir` and write the result to `output_path`.
fn assemble_and_write(
    config: &TurbofanConfig,
    data_dir: &Path,
    output_path: &Path,
) -> Result<PartitionCounts, DatasetError> {
    let train = assemble_train(data_dir)?;
    let test = assemble_test(data_dir)?;
    let counts = PartitionCounts {
        train_rows: train.len(),
        test_rows: test.len(),
        train_engines: train.engine_count(),
        test_engines: test.engine_count(),
    };

    let table = merge_partitions(train, test)?;
    tracing::info!(path = %output_path.display(), "Writing assembled dataset");
    write_table(table, output_path, config.output.shuffle_mode())?;
    Ok(counts)
}
