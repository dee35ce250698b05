use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of postural deviation reported by the brace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Left,
    Right,
    Front,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Right, Direction::Front];

    /// Slot in fixed-size per-direction tables.
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Front => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Front => "F",
        }
    }

    pub fn from_letter(value: &str) -> Option<Self> {
        match value {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            "F" => Some(Direction::Front),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityMode {
    Walking,
    #[default]
    Resting,
}

impl ActivityMode {
    pub fn from_walking(is_walking: bool) -> Self {
        if is_walking {
            ActivityMode::Walking
        } else {
            ActivityMode::Resting
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityMode::Walking => "Walking",
            ActivityMode::Resting => "Resting",
        }
    }
}

/// A decoded token from the brace: start or stop of a deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureCode {
    Start(Direction),
    Stop(Direction),
}

impl PostureCode {
    /// Decodes a raw transport token such as `"L"`, `"SF"` or `"[SR,12]"`.
    ///
    /// Surrounding whitespace and brackets are stripped and only the first
    /// comma-separated field is interpreted. Anything else yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        let token = cleaned.split(',').next()?.trim();

        if let Some(direction) = Direction::from_letter(token) {
            return Some(PostureCode::Start(direction));
        }

        token
            .strip_prefix('S')
            .and_then(Direction::from_letter)
            .map(PostureCode::Stop)
    }
}

/// A posture event that has been closed and is ready to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedEvent {
    pub direction: Direction,
    pub mode: ActivityMode,
    pub session_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: u64,
    /// Created from a stop code that had no matching start.
    pub synthesized: bool,
}

impl CompletedEvent {
    pub fn new(
        direction: Direction,
        mode: ActivityMode,
        session_id: Option<String>,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            direction,
            mode,
            session_id,
            started_at,
            ended_at,
            duration_secs: elapsed_secs(started_at, ended_at),
            synthesized: false,
        }
    }
}

/// Whole seconds between two instants; a backwards clock yields zero.
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}
