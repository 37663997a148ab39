use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;
use walkdir::WalkDir;

use crate::parser::{normalize_document, parse_json_line};
use crate::types::{IngestError, IngestIssue, NormalizeStats, NormalizedBatch, Result};

/// Where raw usage documents come from.
pub trait UsageSource: Send + Sync {
    fn describe(&self) -> String;

    /// Loads and normalizes every document. Invalid documents are counted
    /// in the returned stats; an unreachable source is an error.
    fn load(&self) -> Result<NormalizedBatch>;
}

/// JSON / JSON-lines exports of the usage collection on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<NormalizedBatch> {
        load_path(&self.path)
    }
}

/// Documents held in memory, e.g. handed over by another process.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    documents: Vec<Value>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            label: label.into(),
            documents,
        }
    }
}

impl UsageSource for MemorySource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn load(&self) -> Result<NormalizedBatch> {
        Ok(normalize_documents(&self.label, self.documents.iter()))
    }
}

/// Normalizes already-parsed documents, counting drops instead of failing.
pub fn normalize_documents<'a, I>(source: &str, documents: I) -> NormalizedBatch
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut batch = NormalizedBatch::default();
    for (index, document) in documents.into_iter().enumerate() {
        push_document(&mut batch, source, Some(index + 1), Ok(document));
    }
    batch
}

fn push_document(
    batch: &mut NormalizedBatch,
    source: &str,
    line: Option<usize>,
    document: std::result::Result<&Value, crate::types::NormalizeError>,
) {
    batch.stats.documents_seen += 1;
    match document.and_then(normalize_document) {
        Ok(record) => {
            batch.stats.records_normalized += 1;
            batch.records.push(record);
        }
        Err(err) => batch.stats.record_drop(IngestIssue {
            source: source.to_string(),
            line,
            message: err.to_string(),
        }),
    }
}

fn is_usage_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|value| value.to_str()),
        Some("json") | Some("jsonl") | Some("ndjson")
    )
}

fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_usage_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Loads a single export file or every export file under a directory.
pub fn load_path(root: &Path) -> Result<NormalizedBatch> {
    if !root.exists() {
        return Err(IngestError::Missing(root.to_path_buf()));
    }
    let started = Instant::now();
    let files = collect_files(root)?;
    let parsed: Vec<Result<NormalizedBatch>> = files.par_iter().map(|path| parse_file(path)).collect();

    let mut batch = NormalizedBatch::default();
    for file in parsed {
        let file = file?;
        batch.records.extend(file.records);
        batch.stats.merge(file.stats);
    }
    tracing::debug!(
        source = %root.display(),
        files = batch.stats.files_scanned,
        records = batch.stats.records_normalized,
        dropped = batch.stats.dropped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded usage documents"
    );
    Ok(batch)
}

fn parse_file(path: &Path) -> Result<NormalizedBatch> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let label = path.display().to_string();
    let mut batch = NormalizedBatch::default();
    batch.stats.files_scanned = 1;

    if contents.trim_start().starts_with('[') {
        let documents: Vec<Value> =
            serde_json::from_str(&contents).map_err(|source| IngestError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        for (index, document) in documents.iter().enumerate() {
            push_document(&mut batch, &label, Some(index + 1), Ok(document));
        }
        return Ok(batch);
    }

    for (index, line) in contents.lines().enumerate() {
        let Some(parsed) = parse_json_line(line) else {
            continue;
        };
        match parsed {
            Ok(document) => push_document(&mut batch, &label, Some(index + 1), Ok(&document)),
            Err(err) => push_document(&mut batch, &label, Some(index + 1), Err(err)),
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_documents_counts_drops_and_continues() {
        let documents = vec![
            json!({"timestamp": "2024-01-05", "cpu_hours": 2, "metadata": {"Account": "bio", "Cluster": "grace", "User": "alice", "Partition": "day"}}),
            json!({"timestamp": "2024-01-05", "metadata": {"Account": "bio", "Cluster": "grace", "User": "alice", "Partition": "day"}}),
            json!({"timestamp": "2024-01-06", "cpu_hours": 3, "metadata": {"Account": "bio", "Cluster": "grace", "User": "bob", "Partition": "day"}}),
        ];
        let batch = normalize_documents("memory", documents.iter());
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.stats.documents_seen, 3);
        assert_eq!(batch.stats.dropped, 1);
        assert_eq!(batch.stats.issues[0].line, Some(2));
        assert_eq!(batch.stats.issues[0].message, "missing field cpu_hours");
        assert_eq!(batch.records[1].user, "bob");
    }

    #[test]
    fn usage_file_extensions() {
        assert!(is_usage_file(Path::new("usage.jsonl")));
        assert!(is_usage_file(Path::new("usage.json")));
        assert!(is_usage_file(Path::new("usage.ndjson")));
        assert!(!is_usage_file(Path::new("usage.csv")));
    }
}
