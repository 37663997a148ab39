use std::sync::Arc;

use usage_core::{Dimension, Measure, TimeSeriesRow};
use usage_engine::{
    AggregationFilter, BreakdownView, EXPORT_FILE_NAME, SnapshotInfo, SnapshotStore, SummaryView,
    breakdown, export_csv, filter_records, summary_view, time_series_view,
};

use crate::error::Result;
use crate::selection::{Selection, ViewState};
use crate::services::require_snapshot;

/// Downloadable export body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Clone)]
pub struct UsageService {
    snapshots: Arc<SnapshotStore>,
}

impl UsageService {
    pub(super) fn new(snapshots: Arc<SnapshotStore>) -> Self {
        Self { snapshots }
    }

    pub fn status(&self) -> Option<SnapshotInfo> {
        self.snapshots.current().map(|snapshot| snapshot.info())
    }

    pub fn timeseries(&self, selection: &Selection) -> Result<ViewState<Vec<TimeSeriesRow>>> {
        let Some((filter, measure, view)) = with_view(selection) else {
            return Ok(ViewState::Idle);
        };
        let snapshot = require_snapshot(&self.snapshots)?;
        let rows = time_series_view(&snapshot, &filter, measure, selection.granularity, view)?;
        Ok(ViewState::Ready(rows))
    }

    pub fn breakdown(&self, selection: &Selection) -> Result<ViewState<BreakdownView>> {
        let Some((filter, measure)) = ready(selection) else {
            return Ok(ViewState::Idle);
        };
        let snapshot = require_snapshot(&self.snapshots)?;
        let view = breakdown(&snapshot, &filter, measure, selection.granularity)?;
        Ok(ViewState::Ready(view))
    }

    pub fn summary(&self, selection: &Selection) -> Result<ViewState<SummaryView>> {
        let Some((filter, measure)) = ready(selection) else {
            return Ok(ViewState::Idle);
        };
        let snapshot = require_snapshot(&self.snapshots)?;
        Ok(ViewState::Ready(summary_view(&snapshot, &filter, measure)))
    }

    pub fn export(&self, selection: &Selection) -> Result<ViewState<ExportArtifact>> {
        let Some((filter, measure)) = ready(selection) else {
            return Ok(ViewState::Idle);
        };
        let snapshot = require_snapshot(&self.snapshots)?;
        let body = export_csv(filter_records(&snapshot, &filter), measure)?;
        Ok(ViewState::Ready(ExportArtifact {
            file_name: EXPORT_FILE_NAME,
            content_type: "text/csv; charset=utf-8",
            body,
        }))
    }
}

fn ready(selection: &Selection) -> Option<(AggregationFilter, Measure)> {
    Some((selection.filter()?, selection.measure?))
}

fn with_view(selection: &Selection) -> Option<(AggregationFilter, Measure, Dimension)> {
    let (filter, measure) = ready(selection)?;
    Some((filter, measure, selection.view?))
}
