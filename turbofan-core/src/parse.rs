//! Readers for the raw space-delimited dataset files.
//!
//! Trace lines hold 26 data fields followed by two empty fields (each line
//! ends in two spaces). Ground-truth lines hold one integer and one empty
//! field. Blank lines are skipped.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::DatasetError;
use crate::schema::{
    RAW_DATA_FIELDS, RAW_TRAILING_FIELDS, RawRecord, SENSOR_COUNT, SETTING_COUNT, raw_columns,
};

/// Ground-truth lines end in a single space.
const GROUND_TRUTH_TRAILING_FIELDS: usize = 1;

/// Parse a `train_FD00x.txt` or `test_FD00x.txt` file.
pub fn parse_batch_file(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let file = open(path)?;
    parse_batch(file, &file_label(path))
}

/// Parse a `RUL_FD00x.txt` file. Entry `i` belongs to the engine whose
/// per-batch id is `i + 1`.
pub fn parse_ground_truth(path: &Path) -> Result<Vec<u32>, DatasetError> {
    let file = open(path)?;
    parse_ground_truth_from(file, &file_label(path))
}

/// Parse trace records from any reader. `label` names the input in errors.
pub fn parse_batch<R: Read>(reader: R, label: &str) -> Result<Vec<RawRecord>, DatasetError> {
    let names = raw_columns();
    let mut records = Vec::new();

    for result in space_reader(reader).records() {
        let record = result?;
        let line = line_of(&record);
        let fields = checked_fields(&record, RAW_DATA_FIELDS, RAW_TRAILING_FIELDS, label, line)?;

        let mut settings = [0.0; SETTING_COUNT];
        let mut sensors = [0.0; SENSOR_COUNT];
        for (slot, col) in settings.iter_mut().zip(2..) {
            *slot = field(fields[col], &names[col], label, line)?;
        }
        for (slot, col) in sensors.iter_mut().zip(2 + SETTING_COUNT..) {
            *slot = field(fields[col], &names[col], label, line)?;
        }

        records.push(RawRecord {
            id: field(fields[0], &names[0], label, line)?,
            cycle: field(fields[1], &names[1], label, line)?,
            settings,
            sensors,
        });
    }

    tracing::debug!(file = label, rows = records.len(), "Parsed trace file");
    Ok(records)
}

/// Parse ground-truth values from any reader.
pub fn parse_ground_truth_from<R: Read>(reader: R, label: &str) -> Result<Vec<u32>, DatasetError> {
    let mut values = Vec::new();
    for result in space_reader(reader).records() {
        let record = result?;
        let line = line_of(&record);
        let fields = checked_fields(&record, 1, GROUND_TRUTH_TRAILING_FIELDS, label, line)?;
        values.push(field(fields[0], "RUL_end", label, line)?);
    }
    tracing::debug!(file = label, engines = values.len(), "Parsed ground truth");
    Ok(values)
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DatasetError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Io(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn space_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Return the data fields of `record` after checking the trailing empty fields.
fn checked_fields<'r>(
    record: &'r csv::StringRecord,
    data_fields: usize,
    trailing: usize,
    label: &str,
    line: u64,
) -> Result<Vec<&'r str>, DatasetError> {
    let expected = data_fields + trailing;
    if record.len() != expected {
        return Err(DatasetError::schema(
            label,
            line,
            format!("expected {expected} fields, found {}", record.len()),
        ));
    }
    let fields: Vec<&str> = record.iter().collect();
    if fields[data_fields..].iter().any(|f| !f.is_empty()) {
        return Err(DatasetError::schema(
            label,
            line,
            format!("expected the last {trailing} fields to be empty"),
        ));
    }
    Ok(fields[..data_fields].to_vec())
}

fn field<T: FromStr>(value: &str, column: &str, label: &str, line: u64) -> Result<T, DatasetError> {
    value.parse().map_err(|_| DatasetError::Parse {
        file: label.to_string(),
        line,
        column: column.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trace_line(id: u32, cycle: u32) -> String {
        let mut fields = vec![id.to_string(), cycle.to_string()];
        fields.extend(["-0.0007", "-0.0004", "100.0"].map(String::from));
        fields.extend((1..=SENSOR_COUNT).map(|s| format!("{s}.5")));
        format!("{}  \n", fields.join(" "))
    }

    #[test]
    fn test_parse_trace_drops_trailing_fields() {
        let input = format!("{}{}", trace_line(1, 1), trace_line(1, 2));
        let records = parse_batch(input.as_bytes(), "train_FD001.txt").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 1);
        assert_eq!(records[1].cycle, 2);
        assert_eq!(records[0].settings, [-0.0007, -0.0004, 100.0]);
        assert_eq!(records[0].sensors[0], 1.5);
        assert_eq!(records[0].sensors[20], 21.5);
    }

    #[test]
    fn test_parse_trace_skips_blank_lines_and_crlf() {
        let input = format!("{}\n{}", trace_line(1, 1), trace_line(2, 1)).replace('\n', "\r\n");
        let records = parse_batch(input.as_bytes(), "test_FD002.txt").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn test_missing_trailing_fields_is_schema_error() {
        let input = trace_line(1, 1).replace("  \n", "\n");
        let err = parse_batch(input.as_bytes(), "train_FD003.txt").unwrap_err();
        match err {
            DatasetError::Schema { file, line, .. } => {
                assert_eq!(file, "train_FD003.txt");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field_names_column() {
        let input = trace_line(1, 1).replace("3.5", "n/a");
        let err = parse_batch(input.as_bytes(), "train_FD001.txt").unwrap_err();
        match err {
            DatasetError::Parse { column, value, .. } => {
                assert_eq!(column, "s3");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ground_truth() {
        let values = parse_ground_truth_from("112 \n98 \n\n69 \n".as_bytes(), "RUL_FD001.txt")
            .unwrap();
        assert_eq!(values, vec![112, 98, 69]);
    }

    #[test]
    fn test_ground_truth_without_trailing_field_is_schema_error() {
        let err = parse_ground_truth_from("112\n".as_bytes(), "RUL_FD001.txt").unwrap_err();
        assert!(matches!(err, DatasetError::Schema { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_batch_file(&dir.path().join("train_FD001.txt")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingFile { .. }));
    }
}
