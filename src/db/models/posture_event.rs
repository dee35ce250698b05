use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityMode, Direction};

/// A completed posture event as stored in the audit table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostureEventRecord {
    pub id: i64,
    pub session_id: Option<String>,
    pub direction: Direction,
    pub mode: ActivityMode,
    /// Local day the event is counted against (day of its start).
    pub day: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub synthesized: bool,
}
