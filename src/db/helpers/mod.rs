use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::{PeriodType, SessionStatus};
use crate::models::{ActivityMode, Direction};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn parse_optional_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    value.map(|raw| parse_date(&raw, field)).transpose()
}

pub fn parse_status(value: &str) -> Result<SessionStatus> {
    match value {
        "Active" => Ok(SessionStatus::Active),
        "Completed" => Ok(SessionStatus::Completed),
        "Interrupted" => Ok(SessionStatus::Interrupted),
        other => Err(anyhow!("unknown session status {other}")),
    }
}

pub fn parse_direction(value: &str) -> Result<Direction> {
    Direction::from_letter(value).ok_or_else(|| anyhow!("unknown direction {value}"))
}

pub fn parse_mode(value: &str) -> Result<ActivityMode> {
    match value {
        "Walking" => Ok(ActivityMode::Walking),
        "Resting" => Ok(ActivityMode::Resting),
        other => Err(anyhow!("unknown activity mode {other}")),
    }
}

pub fn parse_period_type(value: &str) -> Result<PeriodType> {
    match value {
        "W" => Ok(PeriodType::Week),
        "M" => Ok(PeriodType::Month),
        other => Err(anyhow!("unknown period type {other}")),
    }
}
