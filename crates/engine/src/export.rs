use std::collections::BTreeSet;

use usage_core::{ClassifiedRecord, Measure};

use crate::error::{EngineError, Result};

pub const EXPORT_FILE_NAME: &str = "usage_report.csv";

/// Optional columns, present only when the rows disagree on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportColumns {
    pub account: bool,
    pub cluster: bool,
}

impl ExportColumns {
    pub fn for_records(records: &[&ClassifiedRecord]) -> Self {
        let accounts: BTreeSet<&str> = records
            .iter()
            .map(|record| record.record.account.as_str())
            .collect();
        let clusters: BTreeSet<&str> = records
            .iter()
            .map(|record| record.record.cluster.as_str())
            .collect();
        Self {
            account: accounts.len() > 1,
            cluster: clusters.len() > 1,
        }
    }

    pub fn header(self, measure: Measure) -> Vec<&'static str> {
        let mut header = Vec::new();
        if self.account {
            header.push("Account");
        }
        if self.cluster {
            header.push("Cluster");
        }
        header.extend(["Partition", "User", measure.label()]);
        header
    }
}

/// Renders filtered detail records as CSV text, ascending by date.
pub fn export_csv<'a, I>(records: I, measure: Measure) -> Result<String>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    let mut rows: Vec<&ClassifiedRecord> = records
        .into_iter()
        .filter(|record| record.measure(measure).is_some())
        .collect();
    rows.sort_by_key(|record| record.record.timestamp);
    let columns = ExportColumns::for_records(&rows);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.header(measure))?;
    for record in rows {
        let value = record.measure(measure).unwrap_or_default();
        let mut fields = Vec::new();
        if columns.account {
            fields.push(record.record.account.clone());
        }
        if columns.cluster {
            fields.push(record.record.cluster.clone());
        }
        fields.push(record.record.partition.clone());
        fields.push(record.record.user.clone());
        fields.push(format!("{:.1}", value));
        writer.write_record(&fields)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| EngineError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| EngineError::Export(err.to_string()))
}
