//! Serialization of the unified table to CSV.

use std::io::Write;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::DatasetError;
use crate::schema::{UnifiedRecord, UnifiedTable, output_columns};

/// Row ordering applied before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleMode {
    /// Keep assembly order (train batches, then test batches).
    Preserve,
    /// Uniform random permutation from the thread RNG.
    Random,
    /// Uniform random permutation, reproducible for a given seed.
    Seeded(u64),
}

/// Reorder rows according to `mode`.
pub fn shuffle_rows(rows: &mut [UnifiedRecord], mode: ShuffleMode) {
    match mode {
        ShuffleMode::Preserve => {}
        ShuffleMode::Random => rows.shuffle(&mut rand::thread_rng()),
        ShuffleMode::Seeded(seed) => rows.shuffle(&mut StdRng::seed_from_u64(seed)),
    }
}

/// Write `table` as comma-separated text with a header row to `path`,
/// replacing any existing file.
pub fn write_table(
    table: UnifiedTable,
    path: &Path,
    mode: ShuffleMode,
) -> Result<(), DatasetError> {
    let file = std::fs::File::create(path)?;
    let rows = write_csv(table, std::io::BufWriter::new(file), mode)?;
    tracing::info!(path = %path.display(), rows, ?mode, "Wrote assembled dataset");
    Ok(())
}

/// Write `table` as CSV to any writer and return the number of data rows.
pub fn write_csv<W: Write>(
    table: UnifiedTable,
    writer: W,
    mode: ShuffleMode,
) -> Result<usize, DatasetError> {
    let mut rows = table.into_rows();
    shuffle_rows(&mut rows, mode);

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(output_columns())?;
    for row in &rows {
        csv.write_record(row.to_fields())?;
    }
    csv.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchIndex;
    use crate::schema::{EngineRecord, SENSOR_COUNT};
    use std::sync::Arc;

    fn table(n: u32) -> UnifiedTable {
        let meta = BatchIndex::Fd003.meta();
        let source: Arc<str> = Arc::from("train_FD003.txt");
        UnifiedTable::new(
            (1..=n)
                .map(|cycle| {
                    UnifiedRecord::labelled(
                        EngineRecord {
                            id: 1,
                            org_id: 1,
                            cycle,
                            settings: [0.0, 0.0, 100.0],
                            sensors: [0.25; SENSOR_COUNT],
                            source: Arc::clone(&source),
                            meta,
                        },
                        n - cycle,
                    )
                })
                .collect(),
        )
    }

    fn render(table: UnifiedTable, mode: ShuffleMode) -> String {
        let mut buf = Vec::new();
        write_csv(table, &mut buf, mode).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_quoting() {
        let out = render(table(2), ShuffleMode::Preserve);
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,cycle,setting1,setting2,setting3,s1,"));
        assert!(header.ends_with(",source,org_id,conditions,fault_modes,RUL,fail"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("1,1,0,0,100,0.25,"));
        // The fault-mode label contains a comma and must be quoted.
        assert!(first.ends_with(
            ",train_FD003.txt,1,ONE (Sea Level),\"TWO (HPC Degradation, Fan Degradation)\",1,0"
        ));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_preserve_is_deterministic() {
        assert_eq!(
            render(table(50), ShuffleMode::Preserve),
            render(table(50), ShuffleMode::Preserve)
        );
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible_permutation() {
        let a = render(table(50), ShuffleMode::Seeded(7));
        let b = render(table(50), ShuffleMode::Seeded(7));
        assert_eq!(a, b);

        let plain = render(table(50), ShuffleMode::Preserve);
        assert_ne!(a, plain);
        let mut sorted_a: Vec<&str> = a.lines().collect();
        let mut sorted_plain: Vec<&str> = plain.lines().collect();
        sorted_a.sort_unstable();
        sorted_plain.sort_unstable();
        assert_eq!(sorted_a, sorted_plain);
    }

    #[test]
    fn test_write_table_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assembledDataset.csv");
        std::fs::write(&path, "stale").unwrap();
        write_table(table(3), &path, ShuffleMode::Random).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,cycle,"));
        assert_eq!(content.lines().count(), 4);
    }
}
