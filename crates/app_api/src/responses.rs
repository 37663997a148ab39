use ingest::IngestIssue;
use serde::Serialize;
use usage_app::RefreshReport;
use usage_engine::SnapshotInfo;

#[derive(Serialize)]
pub struct StatusResponse {
    pub loaded: bool,
    pub snapshot: Option<SnapshotInfo>,
    pub config_path: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub source: String,
    pub snapshot: SnapshotInfo,
    pub documents_seen: usize,
    pub issues: Vec<IngestIssue>,
}

impl From<RefreshReport> for RefreshResponse {
    fn from(report: RefreshReport) -> Self {
        Self {
            source: report.source,
            snapshot: report.snapshot,
            documents_seen: report.documents_seen,
            issues: report.issues,
        }
    }
}
