use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use usage_core::{Measure, MeasureValues, UsageRecord};

use crate::types::NormalizeError;

const METADATA_KEY: &str = "metadata";
const TIMESTAMP_KEY: &str = "timestamp";

/// Flattens one raw usage document into a [`UsageRecord`].
pub fn normalize_document(value: &Value) -> Result<UsageRecord, NormalizeError> {
    let doc = value.as_object().ok_or(NormalizeError::NotAnObject)?;

    let raw_ts = doc
        .get(TIMESTAMP_KEY)
        .filter(|value| !value.is_null())
        .ok_or(NormalizeError::MissingField(TIMESTAMP_KEY))?;
    let timestamp = parse_timestamp(raw_ts)
        .ok_or_else(|| NormalizeError::InvalidTimestamp(display_value(raw_ts)))?;

    let metadata = doc
        .get(METADATA_KEY)
        .and_then(|value| value.as_object())
        .ok_or(NormalizeError::MissingField(METADATA_KEY))?;
    let account = metadata_field(metadata, "Account")?;
    let cluster = metadata_field(metadata, "Cluster")?;
    let user = metadata_field(metadata, "User")?;
    let partition = metadata_field(metadata, "Partition")?;

    let cpu_hours = measure_field(doc, Measure::CpuHours)?
        .ok_or(NormalizeError::MissingField("cpu_hours"))?;
    let measures = MeasureValues {
        cpu_hours,
        gpu_hours: measure_field(doc, Measure::GpuHours)?,
        service_units: measure_field(doc, Measure::ServiceUnits)?,
    };

    Ok(UsageRecord {
        timestamp,
        account,
        cluster,
        user,
        partition,
        measures,
    })
}

/// Parses one JSON line, `None` for blank lines.
pub fn parse_json_line(line: &str) -> Option<Result<Value, NormalizeError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<Value>(line)
            .map_err(|err| NormalizeError::InvalidJson(err.to_string())),
    )
}

fn metadata_field(metadata: &Map<String, Value>, key: &'static str) -> Result<String, NormalizeError> {
    let value = metadata.get(key).ok_or(NormalizeError::MissingField(key))?;
    let text = value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(NormalizeError::EmptyField(key))?;
    Ok(text.to_string())
}

fn measure_field(doc: &Map<String, Value>, measure: Measure) -> Result<Option<f64>, NormalizeError> {
    let field = measure.field_name();
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_number(value)
            .filter(|number| number.is_finite() && *number >= 0.0)
            .map(Some)
            .ok_or_else(|| NormalizeError::InvalidNumber {
                field,
                value: display_value(value),
            }),
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Object(map) => ["$numberDouble", "$numberInt", "$numberLong", "$numberDecimal"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(parse_number),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(raw) => parse_timestamp_str(raw.trim()),
        Value::Number(number) => number.as_i64().and_then(date_from_millis),
        Value::Object(map) => {
            if let Some(inner) = map.get("$date") {
                return parse_timestamp(inner);
            }
            map.get("$numberLong")
                .and_then(|value| value.as_str())
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .and_then(date_from_millis)
        }
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<NaiveDate> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn date_from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
