use std::io;
use std::path::PathBuf;

use serde::Serialize;
use usage_core::UsageRecord;

/// Issues kept per batch; the drop count itself is never capped.
pub const MAX_ISSUES: usize = 100;

/// Normalization summary for one load of the usage source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeStats {
    pub files_scanned: usize,
    pub documents_seen: usize,
    pub records_normalized: usize,
    pub dropped: usize,
    pub issues: Vec<IngestIssue>,
}

impl NormalizeStats {
    pub fn record_drop(&mut self, issue: IngestIssue) {
        self.dropped += 1;
        if self.issues.len() < MAX_ISSUES {
            self.issues.push(issue);
        }
    }

    pub fn merge(&mut self, other: NormalizeStats) {
        self.files_scanned += other.files_scanned;
        self.documents_seen += other.documents_seen;
        self.records_normalized += other.records_normalized;
        self.dropped += other.dropped;
        let room = MAX_ISSUES.saturating_sub(self.issues.len());
        self.issues.extend(other.issues.into_iter().take(room));
    }
}

/// A document that could not be normalized and was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestIssue {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

/// Records produced by one load, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<UsageRecord>,
    pub stats: NormalizeStats,
}

/// Why a single raw document was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("field {0} must be a non-empty string")]
    EmptyField(&'static str),
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(String),
    #[error("field {field} is not a non-negative number: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Errors that abort a whole load.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("usage source {0} does not exist")]
    Missing(PathBuf),
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("walk usage source: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
