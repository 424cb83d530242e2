//! turbofan CLI: download the C-MAPSS archive and write one labelled CSV.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use turbofan_core::{RunOptions, TurbofanConfig};

/// Download and assemble the turbofan engine degradation dataset
#[derive(Parser, Debug)]
#[command(name = "turbofan", version, about, long_about = None)]
struct Cli {
    /// Directory the archive is extracted into and the CSV is written to
    #[arg(short, long, default_value = "turbofanDataset")]
    target_dir: PathBuf,

    /// Replace the target directory if it already exists
    #[arg(short, long)]
    overwrite: bool,

    /// Assemble files already present in the target directory
    #[arg(long)]
    skip_download: bool,

    /// Keep rows in assembly order
    #[arg(long, conflicts_with = "seed")]
    no_shuffle: bool,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Archive URL
    #[arg(long)]
    url: Option<String>,

    /// Output file name inside the target directory
    #[arg(long)]
    output: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Command-line flags win over every config layer.
    fn apply_overrides(&self, config: &mut TurbofanConfig) {
        if let Some(url) = &self.url {
            config.download.url = url.clone();
        }
        if let Some(name) = &self.output {
            config.output.file_name = name.clone();
        }
        if self.no_shuffle {
            config.output.shuffle = false;
        }
        if let Some(seed) = self.seed {
            config.output.shuffle = true;
            config.output.seed = Some(seed);
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            target_dir: self.target_dir.clone(),
            overwrite: self.overwrite,
            skip_download: self.skip_download,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(cli.log_filter()));

    let log_dir = directories::ProjectDirs::from("io", "turbofan", "turbofan")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "turbofan.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let mut config = turbofan_core::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    let options = cli.run_options();
    let summary = turbofan_core::run(&config, &options)
        .await
        .with_context(|| format!("Failed to build dataset in {}", options.target_dir.display()))?;

    if let Some(acquisition) = &summary.acquisition {
        tracing::info!(
            files = acquisition.extracted_files,
            sha256 = %acquisition.archive_sha256,
            "Archive extracted"
        );
    }
    tracing::info!(
        path = %summary.output_path.display(),
        rows = summary.total_rows(),
        train_engines = summary.train_engines,
        test_engines = summary.test_engines,
        "Dataset assembled"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["turbofan"]).unwrap();
        assert_eq!(cli.target_dir, PathBuf::from("turbofanDataset"));
        assert!(!cli.overwrite);
        assert!(!cli.skip_download);
        assert_eq!(cli.log_filter(), "info");

        let mut config = TurbofanConfig::default();
        cli.apply_overrides(&mut config);
        let defaults = TurbofanConfig::default();
        assert_eq!(config.download.url, defaults.download.url);
        assert_eq!(config.output.file_name, defaults.output.file_name);
        assert_eq!(config.output.shuffle_mode(), defaults.output.shuffle_mode());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "turbofan",
            "-t",
            "/tmp/data",
            "-o",
            "--seed",
            "7",
            "--url",
            "http://localhost/data.zip",
            "--output",
            "out.csv",
        ])
        .unwrap();

        let mut config = TurbofanConfig::default();
        config.output.shuffle = false;
        cli.apply_overrides(&mut config);

        assert_eq!(config.download.url, "http://localhost/data.zip");
        assert_eq!(config.output.file_name, "out.csv");
        assert!(config.output.shuffle);
        assert_eq!(config.output.seed, Some(7));

        let options = cli.run_options();
        assert_eq!(options.target_dir, PathBuf::from("/tmp/data"));
        assert!(options.overwrite);
    }

    #[test]
    fn test_no_shuffle() {
        let cli = Cli::try_parse_from(["turbofan", "--no-shuffle", "-q"]).unwrap();
        let mut config = TurbofanConfig::default();
        cli.apply_overrides(&mut config);
        assert!(!config.output.shuffle);
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_no_shuffle_conflicts_with_seed() {
        assert!(Cli::try_parse_from(["turbofan", "--no-shuffle", "--seed", "1"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["turbofan", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
        let cli = Cli::try_parse_from(["turbofan", "-vv"]).unwrap();
        assert_eq!(cli.log_filter(), "trace");
    }
}
