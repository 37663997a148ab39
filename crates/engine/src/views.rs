use serde::Serialize;
use usage_core::{
    BreakdownNode, BreakdownPath, Dimension, Granularity, Measure, SUMMARY_COLUMNS, SummaryRow,
    SummaryRowDisplay, TimeSeriesRow,
};

use crate::aggregate::{
    AggregationFilter, AggregationResult, aggregate_records, category_summary, filter_records,
    user_summary,
};
use crate::error::Result;
use crate::snapshot::DatasetSnapshot;

/// Rows sorted by bucket, then dimension value. Two-dimension keys are
/// joined with " / ".
pub fn time_series(result: &AggregationResult) -> Vec<TimeSeriesRow> {
    let granularity = result.granularity();
    result
        .iter()
        .map(|(key, value)| TimeSeriesRow {
            bucket: granularity.label(key.bucket),
            dimension: key.values.join(" / "),
            value,
        })
        .collect()
}

pub fn time_series_view(
    snapshot: &DatasetSnapshot,
    filter: &AggregationFilter,
    measure: Measure,
    granularity: Granularity,
    dimension: Dimension,
) -> Result<Vec<TimeSeriesRow>> {
    let result = aggregate_records(
        filter_records(snapshot, filter),
        measure,
        granularity,
        &[dimension],
    )?;
    Ok(time_series(&result))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownView {
    pub paths: Vec<BreakdownPath>,
    pub tree: Vec<BreakdownNode>,
}

/// Bucket → partition → user drill-down.
pub fn breakdown(
    snapshot: &DatasetSnapshot,
    filter: &AggregationFilter,
    measure: Measure,
    granularity: Granularity,
) -> Result<BreakdownView> {
    let result = aggregate_records(
        filter_records(snapshot, filter),
        measure,
        granularity,
        &[Dimension::Partition, Dimension::User],
    )?;
    let paths: Vec<BreakdownPath> = result
        .iter()
        .map(|(key, value)| BreakdownPath {
            bucket: granularity.label(key.bucket),
            partition: key.values[0].clone(),
            user: key.values[1].clone(),
            value,
        })
        .collect();
    let tree = build_tree(&paths);
    Ok(BreakdownView { paths, tree })
}

// Paths arrive sorted, so siblings are always adjacent.
fn build_tree(paths: &[BreakdownPath]) -> Vec<BreakdownNode> {
    let mut buckets: Vec<BreakdownNode> = Vec::new();
    for path in paths {
        let bucket = child(&mut buckets, &path.bucket);
        bucket.value += path.value;
        let partition = child(&mut bucket.children, &path.partition);
        partition.value += path.value;
        partition.children.push(BreakdownNode {
            label: path.user.clone(),
            value: path.value,
            children: Vec::new(),
        });
    }
    buckets
}

fn child<'a>(nodes: &'a mut Vec<BreakdownNode>, label: &str) -> &'a mut BreakdownNode {
    let reuse = nodes.last().is_some_and(|node| node.label == label);
    if !reuse {
        nodes.push(BreakdownNode {
            label: label.to_string(),
            value: 0.0,
            children: Vec::new(),
        });
    }
    let last = nodes.len() - 1;
    &mut nodes[last]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
    pub display: Vec<SummaryRowDisplay>,
}

pub fn summary_table(rows: Vec<SummaryRow>) -> SummaryTable {
    let display = rows.iter().map(SummaryRow::display).collect();
    SummaryTable {
        columns: SUMMARY_COLUMNS.iter().map(|column| column.to_string()).collect(),
        rows,
        display,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub monthly: SummaryTable,
    pub users: SummaryTable,
}

/// Monthly table ending in a grand total row, plus the per-user table.
pub fn summary_view(
    snapshot: &DatasetSnapshot,
    filter: &AggregationFilter,
    measure: Measure,
) -> SummaryView {
    let monthly = category_summary(snapshot, filter, measure, Granularity::Month);
    SummaryView {
        monthly: summary_table(monthly.into_rows()),
        users: summary_table(user_summary(snapshot, filter, measure)),
    }
}
