use std::sync::Arc;
use std::time::Instant;

use ingest::{IngestIssue, UsageSource};
use serde::Serialize;
use usage_engine::{DatasetSnapshot, PartitionClassifier, SnapshotInfo, SnapshotStore};

use crate::error::{AppError, Result};
use crate::services::SharedConfig;

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub source: String,
    pub snapshot: SnapshotInfo,
    pub documents_seen: usize,
    pub issues: Vec<IngestIssue>,
}

#[derive(Clone)]
pub struct RefreshService {
    snapshots: Arc<SnapshotStore>,
    source: Arc<dyn UsageSource>,
    classifier: Arc<PartitionClassifier>,
}

impl RefreshService {
    pub(super) fn new(
        config: SharedConfig,
        snapshots: Arc<SnapshotStore>,
        source: Arc<dyn UsageSource>,
    ) -> Self {
        Self {
            snapshots,
            source,
            classifier: Arc::new(PartitionClassifier::new(&config.classifier)),
        }
    }

    /// Rebuilds the snapshot from the source. On failure the previously
    /// published snapshot keeps serving.
    pub fn run(&self) -> Result<RefreshReport> {
        let started = Instant::now();
        let source = self.source.describe();
        tracing::info!(source = %source, "refreshing usage snapshot");

        let mut seen = 0;
        let mut issues = Vec::new();
        let refreshed = self.snapshots.refresh_with(|| {
            let batch = self.source.load()?;
            seen = batch.stats.documents_seen;
            issues = batch.stats.issues;
            if batch.stats.dropped > 0 {
                tracing::warn!(
                    source = %source,
                    dropped = batch.stats.dropped,
                    "dropped invalid usage documents"
                );
            }
            Ok::<_, AppError>(DatasetSnapshot::build(
                batch.records,
                batch.stats.dropped,
                &self.classifier,
            ))
        });

        let snapshot = match refreshed {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(
                    source = %source,
                    error = %err,
                    kept_previous = self.snapshots.current().is_some(),
                    "usage snapshot refresh failed"
                );
                return Err(err);
            }
        };
        if !snapshot.overlapping_partitions().is_empty() {
            tracing::warn!(
                partitions = ?snapshot.overlapping_partitions(),
                "partitions match more than one classifier rule; first rule applied"
            );
        }
        tracing::info!(
            records = snapshot.len(),
            dropped = snapshot.dropped(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "usage snapshot published"
        );
        Ok(RefreshReport {
            source,
            snapshot: snapshot.info(),
            documents_seen: seen,
            issues,
        })
    }
}
