//! Normalization from raw JSON records to typed [`socialdash_core`] entities.
//!
//! Field-level gaps never fail: absent, null or non-numeric numbers become
//! `0`, and unrecognized enum values become the `Unknown` variant. Only
//! structural problems (a scalar where a record or collection belongs) are
//! reported, as [`MetricsError`] naming the field path.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use socialdash_core::{
    Ad, Content, ContentStatus, ContentType, EntitySet, ModerationStats, RoiRecord,
    SatisfactionLevel, SatisfactionRecord, TimeSeriesPoint, User, UserStatus,
};

use crate::error::MetricsError;

type Record = Map<String, Value>;

/// Keys that position a time-series row rather than measure it.
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "date", "time_bucket"];

/// Normalizes a whole raw snapshot into an [`EntitySet`].
///
/// Recognized keys are `users`, `content`, `ads`, `moderation_stats`,
/// `engagement`, `ad_roi` and `satisfaction`. Missing or null keys yield
/// empty collections (or no moderation stats).
///
/// # Errors
///
/// Returns [`MetricsError`] if the snapshot is not an object, a collection
/// is not an array, or a collection element is not an object.
pub fn normalize_entity_set(raw: &Value) -> Result<EntitySet, MetricsError> {
    let root = as_record(raw, "$")?;

    let moderation_stats = match root.get("moderation_stats") {
        None | Some(Value::Null) => None,
        Some(value) => Some(normalize_moderation_stats(value, "moderation_stats")?),
    };

    Ok(EntitySet {
        users: normalize_users(root.get("users"))?,
        content: normalize_contents(root.get("content"))?,
        ads: normalize_ads(root.get("ads"))?,
        moderation_stats,
        engagement: normalize_time_series(root.get("engagement"), "engagement")?,
        ad_roi: normalize_roi_records(root.get("ad_roi"))?,
        satisfaction: normalize_satisfaction_records(root.get("satisfaction"))?,
    })
}

/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_user(value: &Value, path: &str) -> Result<User, MetricsError> {
    let record = as_record(value, path)?;
    Ok(User {
        id: text_field(record, "id").unwrap_or_default(),
        status: parse_user_status(&enum_field(record, "status")),
        region: text_field(record, "region").unwrap_or_else(|| "unknown".to_string()),
    })
}

/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_content(value: &Value, path: &str) -> Result<Content, MetricsError> {
    let record = as_record(value, path)?;
    Ok(Content {
        id: text_field(record, "id").unwrap_or_default(),
        content_type: parse_content_type(&enum_field(record, "content_type")),
        status: parse_content_status(&enum_field(record, "status")),
    })
}

/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_ad(value: &Value, path: &str) -> Result<Ad, MetricsError> {
    let record = as_record(value, path)?;
    Ok(Ad {
        id: text_field(record, "id").unwrap_or_default(),
        title: text_field(record, "title").unwrap_or_default(),
        ctr: number_field(record, "ctr").clamp(0.0, 1.0),
        impressions: count_field(record, "impressions"),
        clicks: count_field(record, "clicks"),
        revenue: amount_field(record, "revenue"),
        cost: amount_field(record, "cost"),
    })
}

/// Normalizes moderation stats from either the flat shape
/// (`total_reports`, `pending_reports`, ...) or the nested API shape
/// (`{"reports": {"total", ...}, "flags": {"total", ...}}`).
///
/// # Errors
///
/// Returns [`MetricsError`] if `value`, or a nested `reports`/`flags`
/// member, is not an object.
pub fn normalize_moderation_stats(
    value: &Value,
    path: &str,
) -> Result<ModerationStats, MetricsError> {
    let record = as_record(value, path)?;

    let reports = match record.get("reports") {
        None | Some(Value::Null) => None,
        Some(nested) => Some(as_record(nested, &format!("{path}.reports"))?),
    };
    let flags = match record.get("flags") {
        None | Some(Value::Null) => None,
        Some(nested) => Some(as_record(nested, &format!("{path}.flags"))?),
    };

    if reports.is_none() && flags.is_none() {
        return Ok(ModerationStats {
            total_reports: count_field(record, "total_reports"),
            pending_reports: count_field(record, "pending_reports"),
            resolved_reports: count_field(record, "resolved_reports"),
            dismissed_reports: count_field(record, "dismissed_reports"),
            total_flags: count_field(record, "total_flags"),
        });
    }

    let report_count = |key: &str| reports.map_or(0, |r| count_field(r, key));
    Ok(ModerationStats {
        total_reports: report_count("total"),
        pending_reports: report_count("pending"),
        resolved_reports: report_count("resolved"),
        dismissed_reports: report_count("dismissed"),
        total_flags: flags.map_or(0, |f| count_field(f, "total")),
    })
}

/// Normalizes one time-series row.
///
/// The timestamp is read from `timestamp`, `date` or `time_bucket`; every
/// other numeric member (except identifiers) becomes a named measure.
/// Returns `Ok(None)` when the row carries no parseable timestamp.
///
/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_time_series_point(
    value: &Value,
    path: &str,
) -> Result<Option<TimeSeriesPoint>, MetricsError> {
    let record = as_record(value, path)?;

    let Some(timestamp) = TIMESTAMP_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(parse_timestamp))
    else {
        return Ok(None);
    };

    let measures: BTreeMap<String, f64> = record
        .iter()
        .filter(|(key, _)| !TIMESTAMP_KEYS.contains(&key.as_str()) && !is_identifier_key(key))
        .filter_map(|(key, value)| parse_number(value).map(|n| (key.clone(), n)))
        .collect();

    Ok(Some(TimeSeriesPoint {
        timestamp,
        measures,
    }))
}

/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_roi_record(value: &Value, path: &str) -> Result<RoiRecord, MetricsError> {
    let record = as_record(value, path)?;
    Ok(RoiRecord {
        date: record
            .get("date")
            .and_then(parse_timestamp)
            .map(|ts| ts.date_naive()),
        ad_id: text_field(record, "ad_id").unwrap_or_default(),
        impressions: count_field(record, "impressions"),
        clicks: count_field(record, "clicks"),
        revenue: amount_field(record, "revenue"),
        cost: amount_field(record, "cost"),
    })
}

/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_satisfaction_record(
    value: &Value,
    path: &str,
) -> Result<SatisfactionRecord, MetricsError> {
    let record = as_record(value, path)?;
    let level = match enum_field(record, "satisfaction_level") {
        level if level.is_empty() => enum_field(record, "level"),
        level => level,
    };
    Ok(SatisfactionRecord {
        satisfaction_level: parse_satisfaction_level(&level),
        count: count_field(record, "count"),
    })
}

/// Reads a `{previous, current}` pair; missing or null sides are `0`.
///
/// # Errors
///
/// Returns [`MetricsError`] if `value` is not an object.
pub fn normalize_trend_pair(value: &Value, path: &str) -> Result<(f64, f64), MetricsError> {
    let record = as_record(value, path)?;
    Ok((
        number_field(record, "previous"),
        number_field(record, "current"),
    ))
}

/// Reads a bare list of numbers. Null or non-numeric elements are `0` so
/// positions are preserved.
///
/// # Errors
///
/// Returns [`MetricsError`] if `value` is present but not an array.
pub fn normalize_number_list(value: Option<&Value>, name: &str) -> Result<Vec<f64>, MetricsError> {
    Ok(as_collection(value, name)?
        .iter()
        .map(|item| parse_number(item).unwrap_or(0.0))
        .collect())
}

/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_users(value: Option<&Value>) -> Result<Vec<User>, MetricsError> {
    normalize_collection(value, "users", normalize_user)
}

/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_contents(value: Option<&Value>) -> Result<Vec<Content>, MetricsError> {
    normalize_collection(value, "content", normalize_content)
}

/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_ads(value: Option<&Value>) -> Result<Vec<Ad>, MetricsError> {
    normalize_collection(value, "ads", normalize_ad)
}

/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_roi_records(value: Option<&Value>) -> Result<Vec<RoiRecord>, MetricsError> {
    normalize_collection(value, "ad_roi", normalize_roi_record)
}

/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_satisfaction_records(
    value: Option<&Value>,
) -> Result<Vec<SatisfactionRecord>, MetricsError> {
    normalize_collection(value, "satisfaction", normalize_satisfaction_record)
}

/// Normalizes a time series and sorts it ascending by timestamp.
///
/// Rows without a usable timestamp cannot be placed on the time axis and
/// are dropped with a warning.
///
/// # Errors
///
/// Returns [`MetricsError`] if the collection or any element is malformed.
pub fn normalize_time_series(
    value: Option<&Value>,
    name: &str,
) -> Result<Vec<TimeSeriesPoint>, MetricsError> {
    let rows = as_collection(value, name)?;
    let mut points = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let path = format!("{name}[{idx}]");
        match normalize_time_series_point(row, &path)? {
            Some(point) => points.push(point),
            None => tracing::warn!(path = %path, "time series row has no parseable timestamp; dropped"),
        }
    }

    points.sort_by_key(|point| point.timestamp);
    Ok(points)
}

fn normalize_collection<T>(
    value: Option<&Value>,
    name: &str,
    normalize: fn(&Value, &str) -> Result<T, MetricsError>,
) -> Result<Vec<T>, MetricsError> {
    as_collection(value, name)?
        .iter()
        .enumerate()
        .map(|(idx, row)| normalize(row, &format!("{name}[{idx}]")))
        .collect()
}

fn as_record<'a>(value: &'a Value, path: &str) -> Result<&'a Record, MetricsError> {
    value.as_object().ok_or_else(|| MetricsError::ExpectedObject {
        path: path.to_string(),
        found: json_kind(value),
    })
}

fn as_collection<'a>(value: Option<&'a Value>, path: &str) -> Result<&'a [Value], MetricsError> {
    match value {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(rows)) => Ok(rows.as_slice()),
        Some(other) => Err(MetricsError::ExpectedArray {
            path: path.to_string(),
            found: json_kind(other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_identifier_key(key: &str) -> bool {
    key == "id" || key.ends_with("_id")
}

/// Numbers, and strings holding a number (decimal columns often arrive as
/// strings). Non-finite values are rejected.
fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn number_field(record: &Record, key: &str) -> f64 {
    record.get(key).and_then(parse_number).unwrap_or(0.0)
}

/// Non-negative monetary amount.
fn amount_field(record: &Record, key: &str) -> f64 {
    number_field(record, key).max(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn count_field(record: &Record, key: &str) -> u64 {
    if let Some(exact) = record.get(key).and_then(Value::as_u64) {
        return exact;
    }
    let n = amount_field(record, key).round();
    if n >= u64::MAX as f64 {
        u64::MAX
    } else {
        n as u64
    }
}

fn text_field(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn enum_field(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
        _ => String::new(),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    // Naive datetimes (no offset) are taken as UTC.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_user_status(s: &str) -> UserStatus {
    match s {
        "active" => UserStatus::Active,
        "inactive" => UserStatus::Inactive,
        "suspended" => UserStatus::Suspended,
        _ => UserStatus::Unknown,
    }
}

fn parse_content_type(s: &str) -> ContentType {
    match s {
        "thread" | "threads" => ContentType::Thread,
        "video" | "videos" => ContentType::Video,
        "mixed" => ContentType::Mixed,
        _ => ContentType::Unknown,
    }
}

fn parse_content_status(s: &str) -> ContentStatus {
    match s {
        "active" => ContentStatus::Active,
        "removed" => ContentStatus::Removed,
        "flagged" => ContentStatus::Flagged,
        _ => ContentStatus::Unknown,
    }
}

fn parse_satisfaction_level(s: &str) -> SatisfactionLevel {
    match s {
        "high" => SatisfactionLevel::High,
        "medium" => SatisfactionLevel::Medium,
        "low" => SatisfactionLevel::Low,
        _ => SatisfactionLevel::Unknown,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
