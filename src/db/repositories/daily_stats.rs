use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, parse_date, to_i64, to_u64},
    models::{DailyStats, WeekStart},
};
use crate::models::{ActivityMode, CompletedEvent, Direction};
use crate::stats::aggregator;

const SELECT_COLUMNS: &str = "date, walking_secs, resting_secs, walking_bad_posture_secs,
     resting_bad_posture_secs, left_events, right_events, front_events";

fn row_to_daily_stats(row: &Row) -> Result<DailyStats> {
    let date: String = row.get("date")?;

    Ok(DailyStats {
        date: parse_date(&date, "date")?,
        walking_secs: to_u64(row.get("walking_secs")?, "walking_secs")?,
        resting_secs: to_u64(row.get("resting_secs")?, "resting_secs")?,
        walking_bad_posture_secs: to_u64(
            row.get("walking_bad_posture_secs")?,
            "walking_bad_posture_secs",
        )?,
        resting_bad_posture_secs: to_u64(
            row.get("resting_bad_posture_secs")?,
            "resting_bad_posture_secs",
        )?,
        left_events: to_u64(row.get("left_events")?, "left_events")?,
        right_events: to_u64(row.get("right_events")?, "right_events")?,
        front_events: to_u64(row.get("front_events")?, "front_events")?,
    })
}

fn time_column(mode: ActivityMode) -> &'static str {
    match mode {
        ActivityMode::Walking => "walking_secs",
        ActivityMode::Resting => "resting_secs",
    }
}

fn bad_posture_column(mode: ActivityMode) -> &'static str {
    match mode {
        ActivityMode::Walking => "walking_bad_posture_secs",
        ActivityMode::Resting => "resting_bad_posture_secs",
    }
}

fn count_column(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "left_events",
        Direction::Right => "right_events",
        Direction::Front => "front_events",
    }
}

/// Create the day's row with zero counters if it does not exist yet.
pub(crate) fn ensure_day(conn: &Connection, date: NaiveDate) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO daily_stats (date, updated_at) VALUES (?1, ?2)",
        params![format_date(date), Utc::now().to_rfc3339()],
    )
    .context("failed to create daily_stats row")?;
    Ok(())
}

/// Read one day, falling back to zeros when no row exists.
pub(crate) fn load_day(conn: &Connection, date: NaiveDate) -> Result<DailyStats> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM daily_stats WHERE date = ?1"
    ))?;
    let found = stmt
        .query_row(params![format_date(date)], |row| {
            Ok(row_to_daily_stats(row))
        })
        .optional()?
        .transpose()?;

    Ok(found.unwrap_or_else(|| DailyStats::zeroed(date)))
}

/// Read every day in `[from, to]`, one entry per calendar day, zeros for gaps.
pub(crate) fn load_days(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyStats>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM daily_stats
         WHERE date >= ?1 AND date <= ?2
         ORDER BY date ASC"
    ))?;

    let mut rows = stmt.query(params![format_date(from), format_date(to)])?;
    let mut stored = HashMap::new();
    while let Some(row) = rows.next()? {
        let stats = row_to_daily_stats(row)?;
        stored.insert(stats.date, stats);
    }

    Ok(from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|day| stored.remove(&day).unwrap_or_else(|| DailyStats::zeroed(day)))
        .collect())
}

pub(crate) fn add_activity_secs(
    conn: &Connection,
    date: NaiveDate,
    mode: ActivityMode,
    secs: u64,
) -> Result<()> {
    let column = time_column(mode);
    conn.execute(
        &format!(
            "UPDATE daily_stats
             SET {column} = {column} + ?1,
                 updated_at = ?2
             WHERE date = ?3"
        ),
        params![to_i64(secs)?, Utc::now().to_rfc3339(), format_date(date)],
    )
    .with_context(|| format!("failed to add {column}"))?;
    Ok(())
}

/// Count a completed event and its bad-posture time against `date`.
pub(crate) fn add_event(conn: &Connection, date: NaiveDate, event: &CompletedEvent) -> Result<()> {
    let bad = bad_posture_column(event.mode);
    let count = count_column(event.direction);
    conn.execute(
        &format!(
            "UPDATE daily_stats
             SET {bad} = {bad} + ?1,
                 {count} = {count} + 1,
                 updated_at = ?2
             WHERE date = ?3"
        ),
        params![
            to_i64(event.duration_secs)?,
            Utc::now().to_rfc3339(),
            format_date(date)
        ],
    )
    .context("failed to count posture event")?;
    Ok(())
}

impl Database {
    /// Snapshot for one day. A day without data is all zeros, not an error.
    pub async fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        self.execute(move |conn| load_day(conn, date)).await
    }

    pub async fn get_daily_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyStats>> {
        self.execute(move |conn| load_days(conn, from, to)).await
    }

    /// Add tracked seconds to a day and refresh the week and month around it.
    ///
    /// Runs as one transaction; on failure nothing is changed.
    pub async fn record_activity(
        &self,
        date: NaiveDate,
        mode: ActivityMode,
        secs: u64,
        week_start: WeekStart,
    ) -> Result<DailyStats> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            ensure_day(&tx, date)?;
            add_activity_secs(&tx, date, mode, secs)?;
            aggregator::refresh_periods_containing(&tx, date, week_start)?;
            let snapshot = load_day(&tx, date)?;

            tx.commit().context("failed to commit activity tick")?;
            Ok(snapshot)
        })
        .await
    }
}
