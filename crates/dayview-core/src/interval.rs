//! Half-open time intervals and the strict overlap test.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidIntervalError;

/// A half-open time range `[start, end)`.
///
/// Construction is checked: `start` must not exceed `end`. Every interval
/// the layout engine and aggregator handle is therefore safe to feed to the
/// overlap formula, which has no guard of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Create a new interval, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidIntervalError> {
        if start > end {
            return Err(InvalidIntervalError { start, end });
        }
        Ok(Self { start, end })
    }

    /// Internal constructor for callers that can prove ordering themselves.
    pub(crate) fn from_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Get the interval's duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Strict overlap test: the shared stretch must have positive length.
    ///
    /// Touching intervals (`[a, b)` and `[b, c)`) do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.end.min(other.end) > self.start.max(other.start)
    }

    /// Smallest interval covering both `self` and `other`.
    pub fn union(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_rejects_reversed_interval() {
        let err = Interval::new(at(10, 0), at(9, 0)).unwrap_err();
        assert_eq!(err.start, at(10, 0));
        assert_eq!(err.end, at(9, 0));
    }

    #[test]
    fn test_empty_interval_is_valid() {
        let iv = Interval::new(at(9, 0), at(9, 0)).unwrap();
        assert_eq!(iv.duration(), Duration::zero());
    }

    #[test]
    fn test_strict_overlap() {
        let a = Interval::new(at(9, 0), at(10, 0)).unwrap();
        let b = Interval::new(at(9, 30), at(10, 30)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = Interval::new(at(9, 0), at(10, 0)).unwrap();
        let b = Interval::new(at(10, 0), at(11, 0)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_contained_interval_overlaps() {
        let outer = Interval::new(at(9, 0), at(12, 0)).unwrap();
        let inner = Interval::new(at(10, 0), at(11, 0)).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_json_round_trip() {
        let interval = Interval::new(at(9, 0), at(10, 30)).unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(interval, back);
    }

    #[test]
    fn test_union_covers_both() {
        let a = Interval::new(at(9, 0), at(10, 0)).unwrap();
        let b = Interval::new(at(9, 30), at(11, 0)).unwrap();
        let u = a.union(&b);
        assert_eq!(u.start(), at(9, 0));
        assert_eq!(u.end(), at(11, 0));
    }
}
