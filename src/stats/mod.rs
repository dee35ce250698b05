pub mod aggregator;
pub mod exposure;
pub mod merge;

pub use aggregator::{build_rollup, trend, PeriodChart, Trend};
pub use exposure::{summarize_events, PostureExposure};
pub use merge::{merge_intervals, Interval, MergedIntervals};
