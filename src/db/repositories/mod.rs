pub mod daily_stats;
pub mod period_rollups;
pub mod posture_events;
pub mod sessions;
