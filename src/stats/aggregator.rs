//! Week and month rollups over the daily accumulators.
//!
//! A rollup is a pure function of the daily rows in its range. The cache in
//! `period_rollups` is trusted on read and replaced whenever a write lands on
//! a day inside the period.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::models::{DailyStats, PeriodRollup, PeriodType, WeekStart};
use crate::db::repositories::{daily_stats, period_rollups};

/// Sum a period's days and pick its best and worst day.
///
/// `days` is expected to hold one entry per calendar day of the period.
/// Percentage ties resolve to the earliest day for both picks.
pub fn build_rollup(
    period_type: PeriodType,
    period_start: NaiveDate,
    days: &[DailyStats],
) -> PeriodRollup {
    let mut rollup = PeriodRollup {
        period_type,
        period_start,
        period_end: period_type.end_for(period_start),
        walking_secs: 0,
        resting_secs: 0,
        walking_bad_posture_secs: 0,
        resting_bad_posture_secs: 0,
        left_events: 0,
        right_events: 0,
        front_events: 0,
        best_day: None,
        worst_day: None,
    };

    let mut best: Option<(NaiveDate, f64)> = None;
    let mut worst: Option<(NaiveDate, f64)> = None;

    for day in days {
        rollup.walking_secs += day.walking_secs;
        rollup.resting_secs += day.resting_secs;
        rollup.walking_bad_posture_secs += day.walking_bad_posture_secs;
        rollup.resting_bad_posture_secs += day.resting_bad_posture_secs;
        rollup.left_events += day.left_events;
        rollup.right_events += day.right_events;
        rollup.front_events += day.front_events;

        let pct = day.bad_posture_percentage();
        if best.map_or(true, |(_, top)| pct < top) {
            best = Some((day.date, pct));
        }
        if worst.map_or(true, |(_, top)| pct > top) {
            worst = Some((day.date, pct));
        }
    }

    rollup.best_day = best.map(|(date, _)| date);
    rollup.worst_day = worst.map(|(date, _)| date);
    rollup
}

pub fn compute_rollup(
    conn: &Connection,
    period_type: PeriodType,
    period_start: NaiveDate,
) -> Result<PeriodRollup> {
    let days = daily_stats::load_days(conn, period_start, period_type.end_for(period_start))?;
    Ok(build_rollup(period_type, period_start, &days))
}

/// Recompute and overwrite the cache entry.
pub fn refresh_rollup(
    conn: &Connection,
    period_type: PeriodType,
    period_start: NaiveDate,
) -> Result<PeriodRollup> {
    let rollup = compute_rollup(conn, period_type, period_start)?;
    period_rollups::store(conn, &rollup)?;
    Ok(rollup)
}

pub fn cached_or_compute(
    conn: &Connection,
    period_type: PeriodType,
    period_start: NaiveDate,
) -> Result<PeriodRollup> {
    if let Some(cached) = period_rollups::load_cached(conn, period_type, period_start)? {
        return Ok(cached);
    }
    refresh_rollup(conn, period_type, period_start)
}

/// Refresh the week and the month that contain `date`.
pub fn refresh_periods_containing(
    conn: &Connection,
    date: NaiveDate,
    week_start: WeekStart,
) -> Result<(PeriodRollup, PeriodRollup)> {
    let week = refresh_rollup(
        conn,
        PeriodType::Week,
        PeriodType::Week.start_containing(date, week_start),
    )?;
    let month = refresh_rollup(
        conn,
        PeriodType::Month,
        PeriodType::Month.start_containing(date, week_start),
    )?;
    Ok((week, month))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

/// Compare the mean bad-posture percentage of the first half of `days` with the second.
pub fn trend(days: &[DailyStats]) -> Trend {
    if days.len() < 2 {
        return Trend::Stable;
    }

    let split = days.len() / 2;
    let mean = |slice: &[DailyStats]| {
        slice.iter().map(DailyStats::bad_posture_percentage).sum::<f64>() / slice.len() as f64
    };
    let first = mean(&days[..split]);
    let second = mean(&days[split..]);

    if second > first {
        Trend::Worsening
    } else if second < first {
        Trend::Improving
    } else {
        Trend::Stable
    }
}

/// Per-day series for a period, for charting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodChart {
    pub rollup: PeriodRollup,
    pub days: Vec<DailyStats>,
    pub trend: Trend,
}

pub fn chart(
    conn: &Connection,
    period_type: PeriodType,
    period_start: NaiveDate,
) -> Result<PeriodChart> {
    let rollup = cached_or_compute(conn, period_type, period_start)?;
    let days = daily_stats::load_days(conn, period_start, rollup.period_end)?;
    Ok(PeriodChart {
        trend: trend(&days),
        rollup,
        days,
    })
}
