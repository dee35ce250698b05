use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PeriodType {
    Week,
    Month,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Week => "W",
            PeriodType::Month => "M",
        }
    }

    /// Last day of the period beginning at `start`, inclusive.
    pub fn end_for(&self, start: NaiveDate) -> NaiveDate {
        match self {
            PeriodType::Week => start
                .checked_add_days(Days::new(6))
                .unwrap_or(NaiveDate::MAX),
            PeriodType::Month => month_start(start)
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Start of the period of this type that contains `date`.
    pub fn start_containing(&self, date: NaiveDate, week_start: WeekStart) -> NaiveDate {
        match self {
            PeriodType::Week => week_start.week_containing(date),
            PeriodType::Month => month_start(date),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    pub fn week_containing(&self, date: NaiveDate) -> NaiveDate {
        date.week(self.weekday()).first_day()
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Cached week or month summary built from daily rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRollup {
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub walking_secs: u64,
    pub resting_secs: u64,
    pub walking_bad_posture_secs: u64,
    pub resting_bad_posture_secs: u64,
    pub left_events: u64,
    pub right_events: u64,
    pub front_events: u64,
    /// Day with the lowest bad-posture percentage.
    pub best_day: Option<NaiveDate>,
    /// Day with the highest bad-posture percentage.
    pub worst_day: Option<NaiveDate>,
}

impl PeriodRollup {
    pub fn total_events(&self) -> u64 {
        self.left_events + self.right_events + self.front_events
    }

    pub fn bad_posture_percentage(&self) -> f64 {
        super::daily_stats::bad_posture_percentage(
            self.walking_bad_posture_secs + self.resting_bad_posture_secs,
            self.walking_secs + self.resting_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_spans_seven_days() {
        assert_eq!(PeriodType::Week.end_for(date(2024, 12, 30)), date(2025, 1, 5));
    }

    #[test]
    fn week_end_saturates_at_the_last_representable_date() {
        assert_eq!(PeriodType::Week.end_for(NaiveDate::MAX), NaiveDate::MAX);
        let near_max = NaiveDate::MAX - Days::new(3);
        assert_eq!(PeriodType::Week.end_for(near_max), NaiveDate::MAX);
    }

    #[test]
    fn month_end_handles_leap_years_and_december() {
        assert_eq!(PeriodType::Month.end_for(date(2024, 2, 1)), date(2024, 2, 29));
        assert_eq!(PeriodType::Month.end_for(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(PeriodType::Month.end_for(date(2024, 12, 1)), date(2024, 12, 31));
        assert_eq!(PeriodType::Month.end_for(date(2024, 4, 1)), date(2024, 4, 30));
    }

    #[test]
    fn period_containing_date() {
        // 2024-06-05 is a Wednesday.
        let wednesday = date(2024, 6, 5);
        assert_eq!(
            PeriodType::Week.start_containing(wednesday, WeekStart::Monday),
            date(2024, 6, 3)
        );
        assert_eq!(
            PeriodType::Week.start_containing(wednesday, WeekStart::Sunday),
            date(2024, 6, 2)
        );
        assert_eq!(
            PeriodType::Month.start_containing(wednesday, WeekStart::Monday),
            date(2024, 6, 1)
        );
    }
}
