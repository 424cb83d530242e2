//! Shared fixtures: synthetic batch files in the published layout.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use turbofan_core::batch::{BatchIndex, Partition};

/// Engines of one batch, as cycle counts. Engine `i` gets id `i + 1`.
pub type Engines = Vec<u32>;

/// Test batch: truncated traces plus ground-truth RUL per engine.
#[derive(Debug, Clone)]
pub struct TestBatch {
    pub engines: Engines,
    pub rul_end: Vec<u32>,
}

/// Contents of a trace file with two trailing empty fields per line.
pub fn trace_file(engines: &[u32]) -> String {
    let mut out = String::new();
    for (id, &cycles) in (1u32..).zip(engines) {
        for cycle in 1..=cycles {
            let mut fields = vec![id.to_string(), cycle.to_string()];
            fields.push(format!("{:.4}", f64::from(cycle) * 0.0001));
            fields.push("-0.0004".to_string());
            fields.push("100.0".to_string());
            fields.extend((1..=21).map(|s| format!("{}.{:02}", 500 + s, cycle % 100)));
            out.push_str(&fields.join(" "));
            out.push_str("  \n");
        }
    }
    out
}

/// Contents of a ground-truth file.
pub fn ground_truth_file(values: &[u32]) -> String {
    values.iter().map(|v| format!("{v} \n")).collect()
}

/// Write all twelve dataset files into `dir`.
pub fn write_dataset(dir: &Path, train: &[Engines; 4], test: &[TestBatch; 4]) {
    for (i, batch) in BatchIndex::ALL.into_iter().enumerate() {
        std::fs::write(
            dir.join(batch.data_file(Partition::Train)),
            trace_file(&train[i]),
        )
        .unwrap();
        std::fs::write(
            dir.join(batch.data_file(Partition::Test)),
            trace_file(&test[i].engines),
        )
        .unwrap();
        std::fs::write(
            dir.join(batch.ground_truth_file()),
            ground_truth_file(&test[i].rul_end),
        )
        .unwrap();
    }
}

/// A small dataset with a different engine count in every batch.
pub fn small_dataset() -> ([Engines; 4], [TestBatch; 4]) {
    let train = [vec![3, 5], vec![2], vec![4, 1, 2], vec![6]];
    let test = [
        TestBatch {
            engines: vec![4, 2],
            rul_end: vec![10, 0],
        },
        TestBatch {
            engines: vec![1],
            rul_end: vec![7],
        },
        TestBatch {
            engines: vec![2, 2],
            rul_end: vec![3, 1],
        },
        TestBatch {
            engines: vec![5, 1, 3],
            rul_end: vec![0, 20, 2],
        },
    ];
    (train, test)
}

/// Build a zip archive in memory containing the given files.
pub fn zip_bytes(files: &[(String, String)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, body) in files {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

/// The small dataset as archive members, plus a readme.
pub fn small_dataset_files() -> Vec<(String, String)> {
    let (train, test) = small_dataset();
    let mut files = vec![("readme.txt".to_string(), "C-MAPSS fixture".to_string())];
    for (i, batch) in BatchIndex::ALL.into_iter().enumerate() {
        files.push((batch.data_file(Partition::Train), trace_file(&train[i])));
        files.push((batch.data_file(Partition::Test), trace_file(&test[i].engines)));
        files.push((batch.ground_truth_file(), ground_truth_file(&test[i].rul_end)));
    }
    files
}
