use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::PostureEventRecord;

use super::merge::{merge_intervals, Interval};

/// Day-level view of bad posture built from the individual event records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostureExposure {
    pub date: NaiveDate,
    pub event_count: u64,
    /// Sum of every event's own duration; concurrent directions add up.
    pub summed_event_secs: u64,
    /// Time spent in any bad posture, overlapping events counted once.
    pub merged_bad_posture_secs: u64,
    pub average_event_secs: f64,
}

pub fn summarize_events(date: NaiveDate, events: &[PostureEventRecord]) -> PostureExposure {
    let summed_event_secs: u64 = events.iter().map(|event| event.duration_secs).sum();
    let merged = merge_intervals(
        events
            .iter()
            .map(|event| Interval::new(event.started_at.timestamp(), event.ended_at.timestamp()))
            .collect(),
    );
    let event_count = events.len() as u64;

    PostureExposure {
        date,
        event_count,
        summed_event_secs,
        merged_bad_posture_secs: merged.total.max(0) as u64,
        average_event_secs: if event_count == 0 {
            0.0
        } else {
            summed_event_secs as f64 / event_count as f64
        },
    }
}
