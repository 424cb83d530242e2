//! Assembly of the per-batch files into one labelled table.
//!
//! Engine ids restart at 1 in every batch file. Each partition is renumbered
//! into one dense id space by folding an [`IdOffset`] over the batches in
//! order, and the test partition is finally shifted past the train one.
//!
//! RUL is keyed on different id spaces per partition:
//! - train: max cycle is grouped by the shifted partition-wide `id`;
//! - test: ground truth and max cycle are both keyed on the per-batch
//!   `org_id`, since the ground-truth file is positional within its batch.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;

use crate::batch::{BatchIndex, BatchMeta, Partition};
use crate::error::DatasetError;
use crate::parse::{parse_batch_file, parse_ground_truth};
use crate::schema::{EngineRecord, RawRecord, UnifiedRecord, UnifiedTable};

/// Highest engine id assigned by the batches folded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdOffset(pub u32);

/// Tag raw records with their source file and batch metadata.
///
/// The returned records still carry their per-batch id in both `id` and
/// `org_id`.
pub fn annotate_batch(raw: Vec<RawRecord>, source: &str, meta: BatchMeta) -> Vec<EngineRecord> {
    let source: Arc<str> = Arc::from(source);
    raw.into_iter()
        .map(|r| EngineRecord {
            id: r.id,
            org_id: r.id,
            cycle: r.cycle,
            settings: r.settings,
            sensors: r.sensors,
            source: Arc::clone(&source),
            meta,
        })
        .collect()
}

/// Shift ids by `offset` and return the offset for the next batch.
pub fn shift_ids(
    mut records: Vec<EngineRecord>,
    offset: IdOffset,
) -> Result<(Vec<EngineRecord>, IdOffset), DatasetError> {
    for record in &mut records {
        record.id = record.id.checked_add(offset.0).ok_or_else(|| {
            DatasetError::overflow(
                &*record.source,
                format!("engine id {} + offset {}", record.id, offset.0),
            )
        })?;
    }
    let next = records.iter().map(|r| r.id).max().unwrap_or(offset.0);
    Ok((records, IdOffset(next)))
}

/// Highest cycle reached per engine, keyed by `key`.
pub fn max_cycle_by<K, F>(records: &[EngineRecord], key: F) -> HashMap<K, u32>
where
    K: Eq + Hash,
    F: Fn(&EngineRecord) -> K,
{
    let mut max_cycles = HashMap::new();
    for record in records {
        let entry = max_cycles.entry(key(record)).or_insert(record.cycle);
        *entry = (*entry).max(record.cycle);
    }
    max_cycles
}

/// Label train records, whose traces run through failure:
/// `RUL = max_cycle - cycle`, grouped by the shifted `id`.
pub fn attach_train_rul(records: Vec<EngineRecord>) -> Vec<UnifiedRecord> {
    let max_cycles = max_cycle_by(&records, |r| r.id);
    records
        .into_iter()
        .map(|r| {
            let rul = max_cycles[&r.id] - r.cycle;
            UnifiedRecord::labelled(r, rul)
        })
        .collect()
}

/// Label the records of one test batch, whose traces stop before failure:
/// `RUL = max_cycle + RUL_end - cycle`.
///
/// `ground_truth[i]` is the RUL at the last recorded cycle of the engine with
/// `org_id == i + 1`. There must be exactly one entry per engine.
pub fn attach_test_rul(
    records: Vec<EngineRecord>,
    ground_truth: &[u32],
    ground_truth_file: &str,
) -> Result<Vec<UnifiedRecord>, DatasetError> {
    let engines: HashSet<u32> = records.iter().map(|r| r.org_id).collect();
    let mismatch = |expected: usize| DatasetError::GroundTruthMismatch {
        file: ground_truth_file.to_string(),
        expected,
        found: ground_truth.len(),
    };
    if engines.len() != ground_truth.len() {
        return Err(mismatch(engines.len()));
    }

    let max_cycles = max_cycle_by(&records, |r| r.org_id);
    records
        .into_iter()
        .map(|r| {
            let rul_end = r
                .org_id
                .checked_sub(1)
                .and_then(|i| ground_truth.get(i as usize))
                .copied()
                .ok_or_else(|| mismatch(r.org_id as usize))?;
            let rul = (max_cycles[&r.org_id] - r.cycle)
                .checked_add(rul_end)
                .ok_or_else(|| {
                    DatasetError::overflow(
                        ground_truth_file,
                        format!("RUL {rul_end} of engine {} at cycle {}", r.org_id, r.cycle),
                    )
                })?;
            Ok(UnifiedRecord::labelled(r, rul))
        })
        .collect()
}

/// Read one batch file of a partition and annotate it.
pub fn load_batch(
    data_dir: &Path,
    batch: BatchIndex,
    partition: Partition,
) -> Result<Vec<EngineRecord>, DatasetError> {
    let file = batch.data_file(partition);
    tracing::info!(file = %file, "Reading and processing file");
    let raw = parse_batch_file(&data_dir.join(&file))?;
    Ok(annotate_batch(raw, &file, batch.meta()))
}

/// Assemble the four train batches into one labelled partition.
pub fn assemble_train(data_dir: &Path) -> Result<UnifiedTable, DatasetError> {
    let (records, offset) = BatchIndex::ALL.into_iter().try_fold(
        (Vec::<EngineRecord>::new(), IdOffset::default()),
        |(mut acc, offset), batch| -> Result<_, DatasetError> {
            let records = load_batch(data_dir, batch, Partition::Train)?;
            let (shifted, next) = shift_ids(records, offset)?;
            tracing::debug!(
                %batch,
                first_id = offset.0.saturating_add(1),
                last_id = next.0,
                "Renumbered train engines"
            );
            acc.extend(shifted);
            Ok((acc, next))
        },
    )?;

    let table = UnifiedTable::new(attach_train_rul(records));
    tracing::info!(rows = table.len(), engines = offset.0, "Assembled train partition");
    Ok(table)
}

/// Assemble the four test batches and their ground truth into one labelled
/// partition. Ids start again at 1, independent of the train partition.
pub fn assemble_test(data_dir: &Path) -> Result<UnifiedTable, DatasetError> {
    let (rows, offset) = BatchIndex::ALL.into_iter().try_fold(
        (Vec::<UnifiedRecord>::new(), IdOffset::default()),
        |(mut acc, offset), batch| -> Result<_, DatasetError> {
            let records = load_batch(data_dir, batch, Partition::Test)?;
            let truth_file = batch.ground_truth_file();
            let ground_truth = parse_ground_truth(&data_dir.join(&truth_file))?;

            let (shifted, next) = shift_ids(records, offset)?;
            tracing::debug!(
                %batch,
                first_id = offset.0.saturating_add(1),
                last_id = next.0,
                "Renumbered test engines"
            );
            acc.extend(attach_test_rul(shifted, &ground_truth, &truth_file)?);
            Ok((acc, next))
        },
    )?;

    let table = UnifiedTable::new(rows);
    tracing::info!(rows = table.len(), engines = offset.0, "Assembled test partition");
    Ok(table)
}

/// Place the test partition after the train partition in one id space.
pub fn merge_partitions(
    train: UnifiedTable,
    test: UnifiedTable,
) -> Result<UnifiedTable, DatasetError> {
    let offset = train.max_id().ok_or_else(|| DatasetError::EmptyPartition {
        partition: Partition::Train.to_string(),
    })?;
    Ok(train.concat(test.offset_ids(offset)?))
}

/// Read every batch under `data_dir` and return the unified table:
/// train rows first, then test rows.
pub fn assemble(data_dir: &Path) -> Result<UnifiedTable, DatasetError> {
    let train = assemble_train(data_dir)?;
    let test = assemble_test(data_dir)?;
    merge_partitions(train, test)
}
