mod parser;
mod paths;
mod pipeline;
mod types;

pub use parser::{normalize_document, parse_json_line};
pub use paths::default_source_path;
pub use pipeline::{FileSource, MemorySource, UsageSource, load_path, normalize_documents};
pub use types::{
    IngestError, IngestIssue, MAX_ISSUES, NormalizeError, NormalizeStats, NormalizedBatch, Result,
};
