use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, parse_date, parse_optional_date, parse_period_type, to_i64, to_u64},
    models::{PeriodRollup, PeriodType},
};
use crate::stats::aggregator::{self, PeriodChart};

fn row_to_rollup(row: &Row) -> Result<PeriodRollup> {
    let period_type: String = row.get("period_type")?;
    let period_start: String = row.get("period_start")?;
    let period_end: String = row.get("period_end")?;

    Ok(PeriodRollup {
        period_type: parse_period_type(&period_type)?,
        period_start: parse_date(&period_start, "period_start")?,
        period_end: parse_date(&period_end, "period_end")?,
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
        best_day: parse_optional_date(row.get("best_day")?, "best_day")?,
        worst_day: parse_optional_date(row.get("worst_day")?, "worst_day")?,
    })
}

pub(crate) fn load_cached(
    conn: &Connection,
    period_type: PeriodType,
    period_start: NaiveDate,
) -> Result<Option<PeriodRollup>> {
    let mut stmt = conn.prepare(
        "SELECT period_type, period_start, period_end, walking_secs, resting_secs,
                walking_bad_posture_secs, resting_bad_posture_secs,
                left_events, right_events, front_events, best_day, worst_day
         FROM period_rollups
         WHERE period_type = ?1 AND period_start = ?2",
    )?;

    let cached = stmt
        .query_row(
            params![period_type.as_str(), format_date(period_start)],
            |row| Ok(row_to_rollup(row)),
        )
        .optional()?
        .transpose()?;

    Ok(cached)
}

/// Insert or overwrite the cache entry for the rollup's key.
pub(crate) fn store(conn: &Connection, rollup: &PeriodRollup) -> Result<()> {
    conn.execute(
        "INSERT INTO period_rollups (
            period_type, period_start, period_end,
            walking_secs, resting_secs, walking_bad_posture_secs, resting_bad_posture_secs,
            left_events, right_events, front_events,
            best_day, worst_day, computed_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT(period_type, period_start) DO UPDATE SET
            period_end = excluded.period_end,
            walking_secs = excluded.walking_secs,
            resting_secs = excluded.resting_secs,
            walking_bad_posture_secs = excluded.walking_bad_posture_secs,
            resting_bad_posture_secs = excluded.resting_bad_posture_secs,
            left_events = excluded.left_events,
            right_events = excluded.right_events,
            front_events = excluded.front_events,
            best_day = excluded.best_day,
            worst_day = excluded.worst_day,
            computed_at = excluded.computed_at",
        params![
            rollup.period_type.as_str(),
            format_date(rollup.period_start),
            format_date(rollup.period_end),
            to_i64(rollup.walking_secs)?,
            to_i64(rollup.resting_secs)?,
            to_i64(rollup.walking_bad_posture_secs)?,
            to_i64(rollup.resting_bad_posture_secs)?,
            to_i64(rollup.left_events)?,
            to_i64(rollup.right_events)?,
            to_i64(rollup.front_events)?,
            rollup.best_day.map(format_date),
            rollup.worst_day.map(format_date),
            Utc::now().to_rfc3339(),
        ],
    )
    .context("failed to store period rollup")?;
    Ok(())
}

impl Database {
    /// Cached rollup if present, otherwise computed from daily rows and cached.
    pub async fn get_rollup(
        &self,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> Result<PeriodRollup> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let rollup = aggregator::cached_or_compute(&tx, period_type, period_start)?;
            tx.commit().context("failed to commit rollup cache")?;
            Ok(rollup)
        })
        .await
    }

    /// Recompute from daily rows and replace whatever is cached.
    pub async fn recompute_rollup(
        &self,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> Result<PeriodRollup> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let rollup = aggregator::refresh_rollup(&tx, period_type, period_start)?;
            tx.commit().context("failed to commit rollup refresh")?;
            Ok(rollup)
        })
        .await
    }

    /// Rollup plus its per-day series and trend.
    pub async fn get_chart(
        &self,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> Result<PeriodChart> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let chart = aggregator::chart(&tx, period_type, period_start)?;
            tx.commit().context("failed to commit rollup cache")?;
            Ok(chart)
        })
        .await
    }

    pub async fn get_cached_rollup(
        &self,
        period_type: PeriodType,
        period_start: NaiveDate,
    ) -> Result<Option<PeriodRollup>> {
        self.execute(move |conn| load_cached(conn, period_type, period_start))
            .await
    }
}
