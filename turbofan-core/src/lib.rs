//! # turbofan-core — C-MAPSS dataset acquisition and assembly
//!
//! Downloads the turbofan engine degradation archive, merges its four
//! batches of train/test traces and ground-truth files into one table with a
//! globally unique engine id and a Remaining Useful Life label, and writes the
//! result as CSV.
//!
//! Stages run strictly in order: `acquire` → `assemble` → `writer`.
//! [`pipeline::run`] chains them.

pub mod acquire;
pub mod assemble;
pub mod batch;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod schema;
pub mod writer;

// Re-exports
pub use assemble::{assemble, assemble_test, assemble_train};
pub use batch::{BatchIndex, BatchMeta, Partition};
pub use config::{TurbofanConfig, load_config};
pub use error::DatasetError;
pub use pipeline::{RunOptions, RunSummary, run};
pub use schema::{UnifiedRecord, UnifiedTable};
pub use writer::{ShuffleMode, write_table};
