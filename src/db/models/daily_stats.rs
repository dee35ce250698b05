//! Per-day accumulator model.
//!
//! One row per local calendar day. Counters only ever grow; a day with no
//! row reads back as all zeros.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Direction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub walking_secs: u64,
    pub resting_secs: u64,
    pub walking_bad_posture_secs: u64,
    pub resting_bad_posture_secs: u64,
    pub left_events: u64,
    pub right_events: u64,
    pub front_events: u64,
}

impl DailyStats {
    pub fn zeroed(date: NaiveDate) -> Self {
        Self {
            date,
            walking_secs: 0,
            resting_secs: 0,
            walking_bad_posture_secs: 0,
            resting_bad_posture_secs: 0,
            left_events: 0,
            right_events: 0,
            front_events: 0,
        }
    }

    pub fn tracked_secs(&self) -> u64 {
        self.walking_secs + self.resting_secs
    }

    pub fn bad_posture_secs(&self) -> u64 {
        self.walking_bad_posture_secs + self.resting_bad_posture_secs
    }

    pub fn events_for(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Left => self.left_events,
            Direction::Right => self.right_events,
            Direction::Front => self.front_events,
        }
    }

    pub fn total_events(&self) -> u64 {
        self.left_events + self.right_events + self.front_events
    }

    /// Share of tracked time spent in bad posture, 0 when nothing was tracked.
    ///
    /// Concurrent directions each add their own duration, so this can exceed
    /// 100 on days with overlapping events.
    pub fn bad_posture_percentage(&self) -> f64 {
        bad_posture_percentage(self.bad_posture_secs(), self.tracked_secs())
    }

    /// Direction with the most events; ties go to the earlier of Left, Right, Front.
    pub fn dominant_direction(&self) -> Option<Direction> {
        let mut best: Option<(Direction, u64)> = None;
        for direction in Direction::ALL {
            let count = self.events_for(direction);
            if count == 0 {
                continue;
            }
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((direction, count)),
            }
        }
        best.map(|(direction, _)| direction)
    }
}

pub fn bad_posture_percentage(bad_secs: u64, tracked_secs: u64) -> f64 {
    if tracked_secs == 0 {
        return 0.0;
    }
    bad_secs as f64 / tracked_secs as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn empty_day_is_zero_percent() {
        let stats = DailyStats::zeroed(day());
        assert_eq!(stats.bad_posture_percentage(), 0.0);
        assert_eq!(stats.dominant_direction(), None);
        assert_eq!(stats.total_events(), 0);
    }

    #[test]
    fn percentage_uses_both_modes() {
        let stats = DailyStats {
            walking_secs: 300,
            resting_secs: 100,
            walking_bad_posture_secs: 30,
            resting_bad_posture_secs: 10,
            ..DailyStats::zeroed(day())
        };
        assert!((stats.bad_posture_percentage() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_events_can_exceed_full_day() {
        let stats = DailyStats {
            walking_secs: 10,
            walking_bad_posture_secs: 15,
            ..DailyStats::zeroed(day())
        };
        assert_eq!(stats.bad_posture_percentage(), 150.0);
    }

    #[test]
    fn dominant_direction_prefers_first_on_tie() {
        let stats = DailyStats {
            left_events: 2,
            right_events: 4,
            front_events: 4,
            ..DailyStats::zeroed(day())
        };
        assert_eq!(stats.dominant_direction(), Some(Direction::Right));
    }
}
