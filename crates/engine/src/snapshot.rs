use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use usage_core::{Category, ClassifiedRecord, UsageRecord};

use crate::classifier::PartitionClassifier;

/// Immutable, classified view of the usage source at one point in time.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    records: Vec<ClassifiedRecord>,
    built_at: DateTime<Utc>,
    dropped: usize,
    overlapping_partitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub built_at: DateTime<Utc>,
    pub records: usize,
    pub dropped: usize,
    pub accounts: usize,
    pub overlapping_partitions: Vec<String>,
}

impl DatasetSnapshot {
    /// Classifies `records` in arrival order.
    pub fn build(
        records: Vec<UsageRecord>,
        dropped: usize,
        classifier: &PartitionClassifier,
    ) -> Self {
        let mut categories: BTreeMap<String, Category> = BTreeMap::new();
        let mut overlapping = BTreeSet::new();
        let records = records
            .into_iter()
            .map(|record| {
                let category = match categories.get(&record.partition) {
                    Some(category) => *category,
                    None => {
                        if classifier.matching_categories(&record.partition).len() > 1 {
                            overlapping.insert(record.partition.clone());
                        }
                        let category = classifier.classify(&record.partition);
                        categories.insert(record.partition.clone(), category);
                        category
                    }
                };
                ClassifiedRecord { record, category }
            })
            .collect();
        Self {
            records,
            built_at: Utc::now(),
            dropped,
            overlapping_partitions: overlapping.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            built_at: Utc::now(),
            dropped: 0,
            overlapping_partitions: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Partitions that matched more than one classifier rule.
    pub fn overlapping_partitions(&self) -> &[String] {
        &self.overlapping_partitions
    }

    /// Distinct accounts, sorted.
    pub fn accounts(&self) -> Vec<String> {
        let accounts: BTreeSet<&str> = self
            .records
            .iter()
            .map(|record| record.record.account.as_str())
            .collect();
        accounts.into_iter().map(str::to_string).collect()
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            built_at: self.built_at,
            records: self.records.len(),
            dropped: self.dropped,
            accounts: self.accounts().len(),
            overlapping_partitions: self.overlapping_partitions.clone(),
        }
    }
}

/// Holds the published snapshot. Readers clone the `Arc`; refreshes swap it.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<DatasetSnapshot>>>,
    refresh: Mutex<()>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: DatasetSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            refresh: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Option<Arc<DatasetSnapshot>> {
        self.current.read().clone()
    }

    pub fn publish(&self, snapshot: DatasetSnapshot) -> Arc<DatasetSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot.clone());
        snapshot
    }

    /// Builds a replacement outside the read lock and publishes it only if
    /// `build` succeeds. Concurrent refreshes run one at a time.
    pub fn refresh_with<F, E>(&self, build: F) -> Result<Arc<DatasetSnapshot>, E>
    where
        F: FnOnce() -> Result<DatasetSnapshot, E>,
    {
        let _guard = self.refresh.lock();
        let snapshot = build()?;
        Ok(self.publish(snapshot))
    }
}
