use serde::{Deserialize, Serialize};

/// Closed interval of epoch seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Builds an interval, swapping the bounds if they arrive reversed.
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of merging: disjoint intervals in ascending order plus the time they cover.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergedIntervals {
    pub intervals: Vec<Interval>,
    pub total: i64,
}

/// Collapse overlapping or touching intervals so concurrent deviations count once.
///
/// Zero-length intervals contribute nothing on their own but still join
/// neighbours they touch.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> MergedIntervals {
    if intervals.is_empty() {
        return MergedIntervals::default();
    }

    intervals.sort_by_key(|interval| interval.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    let mut current = intervals[0];

    for next in intervals.into_iter().skip(1) {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    let total = merged.iter().map(Interval::len).sum();

    MergedIntervals {
        intervals: merged,
        total,
    }
}
