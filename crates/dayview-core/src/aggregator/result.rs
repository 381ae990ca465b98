//! Aggregated per-day event sets handed to subscribers.

use std::sync::Arc;

use crate::day::is_all_day;
use crate::interval::Interval;

/// A resolved record paired with the busy interval it occupies.
///
/// The record itself is externally owned; the aggregator only shares a
/// reference and never inspects it.
#[derive(Debug, Clone)]
pub struct EventRecord<R> {
    pub record: Arc<R>,
    pub interval: Interval,
}

/// Everything a day view needs to render one day.
#[derive(Debug, Clone)]
pub struct AggregateResult<R> {
    /// Total number of records for the day, timed and all-day combined.
    pub amount: usize,
    /// Timed events, sorted ascending by interval start.
    pub events: Vec<EventRecord<R>>,
    /// All-day events, excluded from column packing.
    pub allday: Vec<EventRecord<R>>,
}

impl<R> AggregateResult<R> {
    /// Partition resolved records into all-day vs timed and sort the timed
    /// ones by start.
    pub(crate) fn assemble(day_span: &Interval, resolved: Vec<(Interval, Arc<R>)>) -> Self {
        let mut events = Vec::new();
        let mut allday = Vec::new();
        for (interval, record) in resolved {
            let entry = EventRecord { record, interval };
            if is_all_day(day_span, interval.start(), interval.end()) {
                allday.push(entry);
            } else {
                events.push(entry);
            }
        }
        events.sort_by_key(|e| e.interval.start());

        Self {
            amount: events.len() + allday.len(),
            events,
            allday,
        }
    }
}
