use std::fs;

use ingest::{FileSource, IngestError, UsageSource, load_path};
use tempfile::tempdir;

const GOOD_LINE: &str = r#"{"timestamp":{"$date":"2024-01-05T00:00:00.000Z"},"cpu_hours":10,"metadata":{"Account":"bio","Cluster":"grace","User":"alice","Partition":"pi_bio"}}"#;
const SECOND_LINE: &str = r#"{"timestamp":"2024-01-20T00:00:00Z","cpu_hours":5,"gpu_hours":1.5,"metadata":{"Account":"bio","Cluster":"grace","User":"bob","Partition":"scavenge_gpu"}}"#;
const MISSING_ACCOUNT: &str = r#"{"timestamp":"2024-01-21","cpu_hours":5,"metadata":{"Cluster":"grace","User":"bob","Partition":"day"}}"#;

#[test]
fn loads_jsonl_and_counts_invalid_lines() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("usage.jsonl");
    let contents = format!("{GOOD_LINE}\n\n{MISSING_ACCOUNT}\nnot json\n{SECOND_LINE}\n");
    fs::write(&path, contents).expect("write usage");

    let batch = load_path(&path).expect("load");
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.stats.files_scanned, 1);
    assert_eq!(batch.stats.documents_seen, 4);
    assert_eq!(batch.stats.dropped, 2);
    assert_eq!(batch.stats.issues[0].line, Some(3));
    assert_eq!(batch.stats.issues[0].message, "missing field Account");
    assert_eq!(batch.stats.issues[1].line, Some(4));
    assert_eq!(batch.records[0].user, "alice");
    assert_eq!(batch.records[1].measures.gpu_hours, Some(1.5));
}

#[test]
fn walks_directories_in_path_order() {
    let dir = tempdir().expect("temp dir");
    let nested = dir.path().join("2024/01");
    fs::create_dir_all(&nested).expect("create dirs");
    fs::write(nested.join("b.jsonl"), SECOND_LINE).expect("write b");
    fs::write(nested.join("a.json"), format!("[{GOOD_LINE}]")).expect("write a");
    fs::write(nested.join("notes.txt"), "ignored").expect("write notes");

    let source = FileSource::new(dir.path());
    let batch = source.load().expect("load");
    assert_eq!(batch.stats.files_scanned, 2);
    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].partition, "pi_bio");
    assert_eq!(batch.records[1].partition, "scavenge_gpu");
}

#[test]
fn missing_source_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let err = load_path(&dir.path().join("absent")).expect_err("missing source");
    assert!(matches!(err, IngestError::Missing(_)));
}

#[test]
fn malformed_json_array_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("usage.json");
    fs::write(&path, "[{\"timestamp\": ").expect("write usage");
    let err = load_path(&path).expect_err("malformed array");
    assert!(matches!(err, IngestError::Json { .. }));
}
