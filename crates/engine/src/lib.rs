//! Usage aggregation engine: partition classification, immutable dataset
//! snapshots, grouping/summing, and the views built on top of them.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod export;
pub mod snapshot;
pub mod views;

pub use aggregate::{
    AggregationFilter, AggregationKey, AggregationRequest, AggregationResult, CategorySummary,
    aggregate, aggregate_records, category_summary, filter_records, user_summary,
};
pub use classifier::{ClassifierConfig, ClassifierRule, PartitionClassifier};
pub use error::{EngineError, Result};
pub use export::{EXPORT_FILE_NAME, ExportColumns, export_csv};
pub use snapshot::{DatasetSnapshot, SnapshotInfo, SnapshotStore};
pub use views::{
    BreakdownView, SummaryTable, SummaryView, breakdown, summary_table, summary_view, time_series,
    time_series_view,
};
