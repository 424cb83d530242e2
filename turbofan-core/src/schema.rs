//! Record types and the column layout of raw and assembled data.

use std::collections::HashSet;
use std::sync::Arc;

use crate::batch::BatchMeta;
use crate::error::DatasetError;

pub const SETTING_COUNT: usize = 3;
pub const SENSOR_COUNT: usize = 21;

/// Data fields per raw trace line (`id`, `cycle`, settings, sensors).
pub const RAW_DATA_FIELDS: usize = 2 + SETTING_COUNT + SENSOR_COUNT;

/// Raw lines end in two empty fields that carry no data.
pub const RAW_TRAILING_FIELDS: usize = 2;

/// Names of the raw data fields, in file order.
pub fn raw_columns() -> Vec<String> {
    let mut columns = vec!["id".to_string(), "cycle".to_string()];
    columns.extend((1..=SETTING_COUNT).map(|i| format!("setting{i}")));
    columns.extend((1..=SENSOR_COUNT).map(|i| format!("s{i}")));
    columns
}

/// Header of the assembled CSV.
pub fn output_columns() -> Vec<String> {
    let mut columns = raw_columns();
    columns.extend(
        ["source", "org_id", "conditions", "fault_modes", "RUL", "fail"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

/// One line of a raw trace file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Engine ordinal within its own batch, starting at 1.
    pub id: u32,
    pub cycle: u32,
    pub settings: [f64; SETTING_COUNT],
    pub sensors: [f64; SENSOR_COUNT],
}

/// A raw record tagged with its origin, before labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRecord {
    /// Engine id in the partition-wide (later global) id space.
    pub id: u32,
    /// Engine id as written in the batch file.
    pub org_id: u32,
    pub cycle: u32,
    pub settings: [f64; SETTING_COUNT],
    pub sensors: [f64; SENSOR_COUNT],
    /// File the record was read from.
    pub source: Arc<str>,
    pub meta: BatchMeta,
}

/// `1` when the engine fails at this cycle, else `0`.
pub fn fail_flag(rul: u32) -> u8 {
    u8::from(rul == 0)
}

/// An assembled output row.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRecord {
    pub record: EngineRecord,
    /// Cycles remaining until failure.
    pub rul: u32,
    pub fail: u8,
}

impl UnifiedRecord {
    pub fn labelled(record: EngineRecord, rul: u32) -> Self {
        Self {
            record,
            rul,
            fail: fail_flag(rul),
        }
    }

    /// Field values in `output_columns()` order.
    pub fn to_fields(&self) -> Vec<String> {
        let r = &self.record;
        let mut fields = Vec::with_capacity(RAW_DATA_FIELDS + 6);
        fields.push(r.id.to_string());
        fields.push(r.cycle.to_string());
        fields.extend(r.settings.iter().map(f64::to_string));
        fields.extend(r.sensors.iter().map(f64::to_string));
        fields.push(r.source.to_string());
        fields.push(r.org_id.to_string());
        fields.push(r.meta.conditions.to_string());
        fields.push(r.meta.fault_modes.to_string());
        fields.push(self.rul.to_string());
        fields.push(self.fail.to_string());
        fields
    }
}

/// The assembled, labelled dataset (or one partition of it).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    rows: Vec<UnifiedRecord>,
}

impl UnifiedTable {
    pub fn new(rows: Vec<UnifiedRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[UnifiedRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<UnifiedRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_id(&self) -> Option<u32> {
        self.rows.iter().map(|r| r.record.id).max()
    }

    /// Number of distinct engine ids.
    pub fn engine_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.record.id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Shift every engine id by `offset`.
    pub fn offset_ids(mut self, offset: u32) -> Result<Self, DatasetError> {
        for row in &mut self.rows {
            let r = &mut row.record;
            r.id = r.id.checked_add(offset).ok_or_else(|| {
                DatasetError::overflow(&*r.source, format!("engine id {} + offset {offset}", r.id))
            })?;
        }
        Ok(self)
    }

    /// Append `other` after the rows of `self`.
    pub fn concat(mut self, other: UnifiedTable) -> Self {
        self.rows.extend(other.rows);
        self
    }
}
