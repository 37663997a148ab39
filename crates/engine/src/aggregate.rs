use std::collections::BTreeMap;

use chrono::NaiveDate;
use usage_core::{
    AccountSelection, CategoryFilter, CategoryTotals, ClassifiedRecord, DateRange, Dimension,
    GRAND_TOTAL_LABEL, Granularity, Measure, SummaryRow,
};

use crate::error::{EngineError, Result};
use crate::snapshot::DatasetSnapshot;

/// Conjunction of account, partition-class and date predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationFilter {
    pub accounts: AccountSelection,
    pub category: CategoryFilter,
    pub range: DateRange,
}

impl AggregationFilter {
    pub fn new(accounts: AccountSelection) -> Self {
        Self {
            accounts,
            category: CategoryFilter::All,
            range: DateRange::default(),
        }
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn matches(&self, record: &ClassifiedRecord) -> bool {
        self.accounts.contains(&record.record.account)
            && self.category.matches(record.category)
            && self.range.contains(record.record.timestamp)
    }
}

pub fn filter_records<'a>(
    snapshot: &'a DatasetSnapshot,
    filter: &'a AggregationFilter,
) -> impl Iterator<Item = &'a ClassifiedRecord> + 'a {
    snapshot
        .records()
        .iter()
        .filter(move |record| filter.matches(record))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    pub filter: AggregationFilter,
    pub measure: Measure,
    pub granularity: Granularity,
    pub dimensions: Vec<Dimension>,
}

/// Time bucket plus one value per requested dimension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregationKey {
    pub bucket: NaiveDate,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    measure: Measure,
    granularity: Granularity,
    dimensions: Vec<Dimension>,
    totals: BTreeMap<AggregationKey, f64>,
}

impl AggregationResult {
    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn get(&self, key: &AggregationKey) -> Option<f64> {
        self.totals.get(key).copied()
    }

    /// Entries ordered by bucket, then dimension values.
    pub fn iter(&self) -> impl Iterator<Item = (&AggregationKey, f64)> {
        self.totals.iter().map(|(key, value)| (key, *value))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }
}

pub fn aggregate(snapshot: &DatasetSnapshot, request: &AggregationRequest) -> Result<AggregationResult> {
    aggregate_records(
        filter_records(snapshot, &request.filter),
        request.measure,
        request.granularity,
        &request.dimensions,
    )
}

/// Sums `measure` per (bucket, dimension values). Records that do not
/// report the measure are skipped.
pub fn aggregate_records<'a, I>(
    records: I,
    measure: Measure,
    granularity: Granularity,
    dimensions: &[Dimension],
) -> Result<AggregationResult>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    if dimensions.is_empty() || dimensions.len() > 2 {
        return Err(EngineError::InvalidGrouping(format!(
            "expected 1 or 2 dimensions, got {}",
            dimensions.len()
        )));
    }
    let mut totals: BTreeMap<AggregationKey, f64> = BTreeMap::new();
    for record in records {
        let Some(value) = record.measure(measure) else {
            continue;
        };
        let key = AggregationKey {
            bucket: granularity.truncate(record.record.timestamp),
            values: dimensions
                .iter()
                .map(|dimension| dimension.value_of(&record.record).to_string())
                .collect(),
        };
        *totals.entry(key).or_insert(0.0) += value;
    }
    Ok(AggregationResult {
        measure,
        granularity,
        dimensions: dimensions.to_vec(),
        totals,
    })
}

/// Per-bucket category sums with a trailing grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub rows: Vec<SummaryRow>,
    pub grand_total: SummaryRow,
}

impl CategorySummary {
    /// Bucket rows followed by the grand total row.
    pub fn into_rows(self) -> Vec<SummaryRow> {
        let mut rows = self.rows;
        rows.push(self.grand_total);
        rows
    }
}

pub fn category_summary(
    snapshot: &DatasetSnapshot,
    filter: &AggregationFilter,
    measure: Measure,
    granularity: Granularity,
) -> CategorySummary {
    let mut buckets: BTreeMap<NaiveDate, CategoryTotals> = BTreeMap::new();
    for record in filter_records(snapshot, filter) {
        let Some(value) = record.measure(measure) else {
            continue;
        };
        buckets
            .entry(granularity.truncate(record.record.timestamp))
            .or_default()
            .add(record.category, value);
    }
    let rows: Vec<SummaryRow> = buckets
        .into_iter()
        .map(|(bucket, totals)| SummaryRow {
            label: granularity.label(bucket),
            totals,
        })
        .collect();
    let mut grand = CategoryTotals::default();
    for row in &rows {
        grand.merge(&row.totals);
    }
    CategorySummary {
        rows,
        grand_total: SummaryRow {
            label: GRAND_TOTAL_LABEL.to_string(),
            totals: grand,
        },
    }
}

/// Category sums per user over the whole filtered range, sorted by user.
pub fn user_summary(
    snapshot: &DatasetSnapshot,
    filter: &AggregationFilter,
    measure: Measure,
) -> Vec<SummaryRow> {
    let mut users: BTreeMap<&str, CategoryTotals> = BTreeMap::new();
    for record in filter_records(snapshot, filter) {
        let Some(value) = record.measure(measure) else {
            continue;
        };
        users
            .entry(record.record.user.as_str())
            .or_default()
            .add(record.category, value);
    }
    users
        .into_iter()
        .map(|(user, totals)| SummaryRow {
            label: user.to_string(),
            totals,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PartitionClassifier;
    use usage_core::{Category, MeasureValues, UsageRecord};

    fn record(date: &str, account: &str, partition: &str, user: &str, cpu: f64) -> UsageRecord {
        UsageRecord {
            timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
            account: account.to_string(),
            cluster: "grace".to_string(),
            user: user.to_string(),
            partition: partition.to_string(),
            measures: MeasureValues::cpu(cpu),
        }
    }

    fn snapshot(records: Vec<UsageRecord>) -> DatasetSnapshot {
        DatasetSnapshot::build(records, 0, &PartitionClassifier::default())
    }

    fn bio() -> AggregationFilter {
        AggregationFilter::new(AccountSelection::One("bio".to_string()))
    }

    #[test]
    fn duplicate_keys_are_summed() {
        let snap = snapshot(vec![
            record("2024-01-05", "bio", "day", "alice", 1.0),
            record("2024-01-05", "bio", "day", "alice", 2.0),
            record("2024-01-06", "bio", "day", "alice", 4.0),
        ]);
        let request = AggregationRequest {
            filter: bio(),
            measure: Measure::CpuHours,
            granularity: Granularity::Day,
            dimensions: vec![Dimension::User],
        };
        let result = aggregate(&snap, &request).expect("aggregate");
        assert_eq!(result.len(), 2);
        let key = AggregationKey {
            bucket: NaiveDate::from_ymd_opt(2024, 1, 5).expect("date"),
            values: vec!["alice".to_string()],
        };
        assert_eq!(result.get(&key), Some(3.0));
        assert_eq!(result.total(), 7.0);
    }

    #[test]
    fn filter_is_a_conjunction() {
        let snap = snapshot(vec![
            record("2024-01-05", "bio", "pi_bio", "alice", 1.0),
            record("2024-01-05", "chem", "pi_chem", "carol", 2.0),
            record("2024-02-05", "bio", "pi_bio", "alice", 4.0),
            record("2024-01-07", "bio", "day", "alice", 8.0),
        ]);
        let filter = bio()
            .with_category(CategoryFilter::Only(Category::Private))
            .with_range(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1),
                end: NaiveDate::from_ymd_opt(2024, 1, 31),
            });
        let matched: Vec<f64> = filter_records(&snap, &filter)
            .map(|record| record.record.measures.cpu_hours)
            .collect();
        assert_eq!(matched, vec![1.0]);
    }

    #[test]
    fn empty_match_returns_empty_result() {
        let snap = snapshot(vec![record("2024-01-05", "chem", "day", "carol", 1.0)]);
        let request = AggregationRequest {
            filter: bio(),
            measure: Measure::CpuHours,
            granularity: Granularity::Month,
            dimensions: vec![Dimension::Partition],
        };
        let result = aggregate(&snap, &request).expect("aggregate");
        assert!(result.is_empty());
        assert_eq!(result.total(), 0.0);
    }

    #[test]
    fn rejects_bad_dimension_counts() {
        let snap = snapshot(Vec::new());
        for dimensions in [
            vec![],
            vec![Dimension::User, Dimension::Partition, Dimension::Cluster],
        ] {
            let request = AggregationRequest {
                filter: bio(),
                measure: Measure::CpuHours,
                granularity: Granularity::Day,
                dimensions,
            };
            assert!(matches!(
                aggregate(&snap, &request),
                Err(EngineError::InvalidGrouping(_))
            ));
        }
    }

    #[test]
    fn unreported_measures_are_skipped() {
        let mut with_gpu = record("2024-01-05", "bio", "gpu", "alice", 1.0);
        with_gpu.measures.gpu_hours = Some(0.5);
        let snap = snapshot(vec![with_gpu, record("2024-01-05", "bio", "gpu", "bob", 3.0)]);
        let request = AggregationRequest {
            filter: bio(),
            measure: Measure::GpuHours,
            granularity: Granularity::Day,
            dimensions: vec![Dimension::User],
        };
        let result = aggregate(&snap, &request).expect("aggregate");
        assert_eq!(result.len(), 1);
        assert_eq!(result.total(), 0.5);
    }

    #[test]
    fn user_summary_is_sorted_by_user() {
        let snap = snapshot(vec![
            record("2024-01-05", "bio", "day", "zed", 1.0),
            record("2024-01-05", "bio", "pi_bio", "alice", 2.0),
            record("2024-02-05", "bio", "scavenge", "alice", 3.0),
        ]);
        let rows = user_summary(&snap, &bio(), Measure::CpuHours);
        let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["alice", "zed"]);
        assert_eq!(rows[0].totals.total, 5.0);
        assert_eq!(rows[0].totals.private, 2.0);
        assert_eq!(rows[0].totals.scavenge, 3.0);
        assert_eq!(rows[1].totals.commons, 1.0);
    }
}
