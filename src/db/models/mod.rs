pub mod daily_stats;
pub mod period_rollup;
pub mod posture_event;
pub mod session;

pub use daily_stats::DailyStats;
pub use period_rollup::{month_start, PeriodRollup, PeriodType, WeekStart};
pub use posture_event::PostureEventRecord;
pub use session::{SessionStatus, WalkingSession};
