use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Source of wall-clock time for the stats core.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used for replay and tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.guard() = at;
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut guard = self.guard();
        *guard += Duration::seconds(secs);
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.guard()
    }
}

/// Time zone used to decide which calendar day an instant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    System,
    Fixed(FixedOffset),
}

impl LocalZone {
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .map(LocalZone::Fixed)
            .unwrap_or(LocalZone::System)
    }

    pub fn utc() -> Self {
        LocalZone::Fixed(Utc.fix())
    }

    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            LocalZone::System => at.with_timezone(&Local).date_naive(),
            LocalZone::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }

    /// First instant of the local day following the one containing `at`.
    pub fn next_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let tomorrow = self.date_of(at).succ_opt().unwrap_or(NaiveDate::MAX);
        let midnight = tomorrow.and_hms_opt(0, 0, 0).unwrap_or_default();
        let resolved = match self {
            LocalZone::System => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            LocalZone::Fixed(offset) => offset
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        // A gap at local midnight (DST) falls back to a day from now.
        resolved.unwrap_or(at + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_zone_shifts_day_boundary() {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 23, 30, 0).unwrap();
        let plus_two = LocalZone::from_offset_minutes(Some(120));

        assert_eq!(LocalZone::utc().date_of(at), NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(plus_two.date_of(at), NaiveDate::from_ymd_opt(2024, 5, 11).unwrap());
    }

    #[test]
    fn next_midnight_respects_offset() {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 20, 0, 0).unwrap();
        let minus_five = LocalZone::from_offset_minutes(Some(-300));

        assert_eq!(
            LocalZone::utc().next_midnight(at),
            Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap()
        );
        assert_eq!(
            minus_five.next_midnight(at),
            Utc.with_ymd_and_hms(2024, 5, 11, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance_secs(90);
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }
}
