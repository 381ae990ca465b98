//! Day canonicalization helpers.
//!
//! All aggregator state is keyed by [`DayKey`], an immutable value derived
//! from an instant exactly once. Day spans are always re-derived from the
//! key, never from a datetime retained across an async boundary: callers may
//! mutate or reuse the values they handed in.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Immutable canonical identifier for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Canonicalize an instant to the day containing it.
    pub fn canonicalize(at: DateTime<Utc>) -> Self {
        Self(at.date_naive())
    }

    /// Build a key directly from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Full span of the day: `[midnight, midnight + 1 day)`.
    pub fn span(&self) -> Interval {
        let start = self.0.and_time(NaiveTime::MIN).and_utc();
        Interval::from_ordered(start, start + Duration::days(1))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// True when an event covers the whole day boundary-to-boundary.
///
/// All-day events are excluded from column packing.
pub fn is_all_day(day_span: &Interval, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= day_span.start() && end >= day_span.end()
}
