use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Usage measures a raw document can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    CpuHours,
    GpuHours,
    ServiceUnits,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::CpuHours, Measure::GpuHours, Measure::ServiceUnits];

    /// Field name in raw usage documents.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::CpuHours => "cpu_hours",
            Self::GpuHours => "gpu_hours",
            Self::ServiceUnits => "service_units",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CpuHours => "CPU Hours",
            Self::GpuHours => "GPU Hours",
            Self::ServiceUnits => "Service Units",
        }
    }

    /// Accepts display labels ("CPU Hours") and field names ("cpu_hours").
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|measure| {
            measure.label().eq_ignore_ascii_case(value)
                || measure.field_name().eq_ignore_ascii_case(value)
        })
    }

    pub fn value_of(self, values: &MeasureValues) -> Option<f64> {
        match self {
            Self::CpuHours => Some(values.cpu_hours),
            Self::GpuHours => values.gpu_hours,
            Self::ServiceUnits => values.service_units,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measure values carried by one record. `None` means "not reported".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureValues {
    pub cpu_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_units: Option<f64>,
}

impl MeasureValues {
    pub fn cpu(cpu_hours: f64) -> Self {
        Self {
            cpu_hours,
            ..Self::default()
        }
    }

    pub fn get(&self, measure: Measure) -> Option<f64> {
        measure.value_of(self)
    }
}

/// Cost/priority class derived from a partition name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Commons,
    Private,
    Scavenge,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Commons, Category::Private, Category::Scavenge];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commons => "commons",
            Self::Private => "private",
            Self::Scavenge => "scavenge",
        }
    }

    /// Column heading used in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Commons => "Commons",
            Self::Private => "PI",
            Self::Scavenge => "Scavenge",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|category| {
            category.as_str().eq_ignore_ascii_case(value)
                || category.label().eq_ignore_ascii_case(value)
        })
    }
}

/// Partition-class filter chosen by the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        Category::parse(value).map(Self::Only)
    }
}

/// Usage record after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: NaiveDate,
    pub account: String,
    pub cluster: String,
    pub user: String,
    pub partition: String,
    pub measures: MeasureValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: UsageRecord,
    pub category: Category,
}

impl ClassifiedRecord {
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        self.record.measures.get(measure)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

impl Granularity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" | "d" => Some(Self::Day),
            "month" | "monthly" | "m" => Some(Self::Month),
            _ => None,
        }
    }

    /// Start of the calendar bucket containing `date`.
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }

    pub fn label(self, bucket: NaiveDate) -> String {
        match self {
            Self::Day => bucket.format("%Y-%m-%d").to_string(),
            Self::Month => bucket.format("%Y-%m").to_string(),
        }
    }
}

/// Record fields usable as grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Partition,
    User,
    Account,
    Cluster,
}

impl Dimension {
    pub fn value_of(self, record: &UsageRecord) -> &str {
        match self {
            Self::Partition => &record.partition,
            Self::User => &record.user,
            Self::Account => &record.account,
            Self::Cluster => &record.cluster,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Partition => "Partition",
            Self::User => "User",
            Self::Account => "Account",
            Self::Cluster => "Cluster",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "partition" => Some(Self::Partition),
            "user" => Some(Self::User),
            "account" => Some(Self::Account),
            "cluster" => Some(Self::Cluster),
            _ => None,
        }
    }
}

/// Accounts a request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountSelection {
    One(String),
    Many(BTreeSet<String>),
}

impl AccountSelection {
    /// Builds a selection from a list, `None` when nothing is selected.
    pub fn from_list<I, S>(accounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = accounts
            .into_iter()
            .map(Into::into)
            .filter(|account| !account.trim().is_empty())
            .collect();
        match set.len() {
            0 => None,
            1 => set.pop_first().map(Self::One),
            _ => Some(Self::Many(set)),
        }
    }

    pub fn contains(&self, account: &str) -> bool {
        match self {
            Self::One(value) => value == account,
            Self::Many(values) => values.contains(account),
        }
    }
}

/// Inclusive calendar range. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub bucket: String,
    pub dimension: String,
    pub value: f64,
}

/// Leaf of the bucket → partition → user breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownPath {
    pub bucket: String,
    pub partition: String,
    pub user: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownNode {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<BreakdownNode>,
}

/// Per-category sums for one row of a summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub total: f64,
    pub commons: f64,
    pub private: f64,
    pub scavenge: f64,
}

impl CategoryTotals {
    pub fn add(&mut self, category: Category, value: f64) {
        self.total += value;
        match category {
            Category::Commons => self.commons += value,
            Category::Private => self.private += value,
            Category::Scavenge => self.scavenge += value,
        }
    }

    pub fn merge(&mut self, other: &CategoryTotals) {
        self.total += other.total;
        self.commons += other.commons;
        self.private += other.private;
        self.scavenge += other.scavenge;
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Commons => self.commons,
            Category::Private => self.private,
            Category::Scavenge => self.scavenge,
        }
    }
}

pub const GRAND_TOTAL_LABEL: &str = "Grand Total";
pub const SUMMARY_COLUMNS: [&str; 4] = ["Total", "Commons", "PI", "Scavenge"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    #[serde(flatten)]
    pub totals: CategoryTotals,
}

impl SummaryRow {
    pub fn display(&self) -> SummaryRowDisplay {
        SummaryRowDisplay {
            label: self.label.clone(),
            total: format_hours(self.totals.total),
            commons: format_hours(self.totals.commons),
            private: format_hours(self.totals.private),
            scavenge: format_hours(self.totals.scavenge),
        }
    }
}

/// Display strings for a summary row; keys follow `SUMMARY_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRowDisplay {
    pub label: String,
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Commons")]
    pub commons: String,
    #[serde(rename = "PI")]
    pub private: String,
    #[serde(rename = "Scavenge")]
    pub scavenge: String,
}

/// One decimal place with thousands separators, e.g. `12,345.6`.
pub fn format_hours(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    let (negative, digits) = match formatted.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, formatted.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "0"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, ch) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let is_zero = int_part.chars().all(|ch| ch == '0') && frac_part.chars().all(|ch| ch == '0');
    if negative && !is_zero {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}
