use chrono::{Datelike, Duration, Local, NaiveDate};
use usage_core::DateRange;

use crate::config::RangeParams;
use crate::error::{AppError, Result};

pub fn resolve_range(params: &RangeParams) -> Result<DateRange> {
    resolve_range_at(params, Local::now().date_naive())
}

/// Explicit `start`/`end` win over the `range` preset. Both ends are
/// inclusive calendar dates.
pub fn resolve_range_at(params: &RangeParams, today: NaiveDate) -> Result<DateRange> {
    if params.start.is_some() || params.end.is_some() {
        let start = params.start.as_deref().map(parse_date).transpose()?;
        let end = params.end.as_deref().map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(AppError::InvalidInput(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        return Ok(DateRange { start, end });
    }
    let start = match params.range.as_deref().unwrap_or("alltime") {
        "alltime" => return Ok(DateRange::default()),
        "thismonth" => today.with_day(1),
        "thisyear" => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        "last30days" => Some(today - Duration::days(30)),
        "last90days" => Some(today - Duration::days(90)),
        "last365days" => Some(today - Duration::days(365)),
        value => {
            return Err(AppError::InvalidInput(format!(
                "unsupported range {}",
                value
            )));
        }
    };
    let start = start.ok_or_else(|| AppError::InvalidInput("invalid local date".to_string()))?;
    Ok(DateRange {
        start: Some(start),
        end: Some(today),
    })
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(value)
                .map(|parsed| parsed.with_timezone(&chrono::Utc).date_naive())
        })
        .map_err(|err| AppError::InvalidInput(format!("invalid date {}: {}", value, err)))
}
