use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, parse_date, parse_datetime, parse_direction, parse_mode, to_i64, to_u64},
    models::{DailyStats, PostureEventRecord, WeekStart},
    repositories::daily_stats,
};
use crate::models::CompletedEvent;
use crate::stats::aggregator;

fn row_to_event(row: &Row) -> Result<PostureEventRecord> {
    let direction: String = row.get("direction")?;
    let mode: String = row.get("mode")?;
    let day: String = row.get("day")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;

    Ok(PostureEventRecord {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        direction: parse_direction(&direction)?,
        mode: parse_mode(&mode)?,
        day: parse_date(&day, "day")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
        duration_secs: to_u64(row.get("duration_secs")?, "duration_secs")?,
        synthesized: row.get("synthesized")?,
    })
}

pub(crate) fn insert_event(
    conn: &Connection,
    day: NaiveDate,
    event: &CompletedEvent,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO posture_events (
            session_id, direction, mode, day, started_at, ended_at, duration_secs, synthesized
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.session_id,
            event.direction.as_str(),
            event.mode.as_str(),
            format_date(day),
            event.started_at.to_rfc3339(),
            event.ended_at.to_rfc3339(),
            to_i64(event.duration_secs)?,
            event.synthesized,
        ],
    )
    .context("failed to insert posture event")?;
    Ok(conn.last_insert_rowid())
}

fn query_events(conn: &Connection, filter: &str, value: String) -> Result<Vec<PostureEventRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, session_id, direction, mode, day, started_at, ended_at, duration_secs,
                synthesized
         FROM posture_events
         WHERE {filter} = ?1
         ORDER BY started_at ASC, id ASC"
    ))?;

    let mut rows = stmt.query(params![value])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        events.push(row_to_event(row)?);
    }
    Ok(events)
}

impl Database {
    /// Persist a closed event and count it against `day`, refreshing that
    /// day's week and month. All of it commits or none of it does.
    pub async fn record_completed_event(
        &self,
        event: &CompletedEvent,
        day: NaiveDate,
        week_start: WeekStart,
    ) -> Result<(i64, DailyStats)> {
        let record = event.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let id = insert_event(&tx, day, &record)?;
            daily_stats::ensure_day(&tx, day)?;
            daily_stats::add_event(&tx, day, &record)?;
            aggregator::refresh_periods_containing(&tx, day, week_start)?;
            let snapshot = daily_stats::load_day(&tx, day)?;

            tx.commit().context("failed to commit posture event")?;
            Ok((id, snapshot))
        })
        .await
    }

    pub async fn get_events_for_day(&self, day: NaiveDate) -> Result<Vec<PostureEventRecord>> {
        self.execute(move |conn| query_events(conn, "day", format_date(day)))
            .await
    }

    pub async fn get_events_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<PostureEventRecord>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| query_events(conn, "session_id", session_id))
            .await
    }
}
