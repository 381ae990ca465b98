//! End-to-end test: time store -> day aggregator -> overlap layout.
//!
//! Exercises the full control flow the library exists for: a store change
//! burst is coalesced into one aggregate, whose timed events are then
//! packed into columns and emitted as render attributes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use dayview_core::{
    AggregateResult, ChangeNotifier, DayAggregator, Interval, LayoutAttrs, ObserverToken,
    OverlapLayout, StoreError, TimeStore,
};

#[derive(Debug, Clone)]
struct Meeting {
    title: &'static str,
}

/// Minimal in-memory store backing the pipeline test.
struct MemoryStore {
    busy: Mutex<Vec<(Interval, Arc<Meeting>)>>,
    notifiers: Mutex<HashMap<u64, ChangeNotifier>>,
    next_token: AtomicU64,
}

impl MemoryStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            busy: Mutex::new(Vec::new()),
            notifiers: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        })
    }

    fn add(&self, interval: Interval, title: &'static str) {
        self.busy
            .lock()
            .unwrap()
            .push((interval, Arc::new(Meeting { title })));
    }

    fn fire_change(&self) {
        let notifiers: Vec<ChangeNotifier> =
            self.notifiers.lock().unwrap().values().cloned().collect();
        for notifier in notifiers {
            notifier.notify();
        }
    }
}

impl TimeStore for MemoryStore {
    type Record = Meeting;

    fn observe_time(&self, _span: &Interval, on_change: ChangeNotifier) -> ObserverToken {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        self.notifiers.lock().unwrap().insert(token, on_change);
        ObserverToken(token)
    }

    fn remove_time_observer(&self, token: ObserverToken) {
        self.notifiers.lock().unwrap().remove(&token.0);
    }

    fn query_cache(&self, span: &Interval) -> Vec<Interval> {
        self.busy
            .lock()
            .unwrap()
            .iter()
            .filter(|(interval, _)| interval.overlaps(span))
            .map(|(interval, _)| *interval)
            .collect()
    }

    fn resolve_associated(
        &self,
        intervals: Vec<Interval>,
    ) -> impl Future<Output = Result<Vec<(Interval, Arc<Meeting>)>, StoreError>> + Send {
        let busy = self.busy.lock().unwrap();
        let resolved: Vec<(Interval, Arc<Meeting>)> = intervals
            .iter()
            .filter_map(|interval| {
                busy.iter()
                    .find(|(b, _)| b == interval)
                    .map(|(_, record)| (*interval, Arc::clone(record)))
            })
            .collect();
        async move { Ok(resolved) }
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
}

fn iv(start: (u32, u32), end: (u32, u32)) -> Interval {
    Interval::new(at(start.0, start.1), at(end.0, end.1)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_store_burst_to_rendered_columns() {
    let store = MemoryStore::new();
    store.add(iv((9, 0), (10, 0)), "standup");
    store.add(iv((9, 30), (10, 30)), "1:1");
    store.add(iv((13, 0), (14, 0)), "lunch n learn");
    store.add(
        Interval::new(at(0, 0), at(0, 0) + chrono::Duration::days(1)).unwrap(),
        "conference day",
    );

    let aggregator = DayAggregator::new(Arc::clone(&store));
    let results: Arc<Mutex<Vec<Arc<AggregateResult<Meeting>>>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    aggregator.subscribe(at(12, 0), move |result| {
        sink.lock().unwrap().push(Arc::clone(result))
    });

    // A burst of store changes coalesces into a single recompute.
    store.fire_change();
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.fire_change();
    tokio::time::sleep(Duration::from_millis(60)).await;

    let aggregate = {
        let seen = results.lock().unwrap();
        assert_eq!(seen.len(), 1);
        Arc::clone(&seen[0])
    };
    assert_eq!(aggregate.amount, 4);
    assert_eq!(aggregate.allday.len(), 1);
    assert_eq!(aggregate.allday[0].record.title, "conference day");

    let titles: Vec<_> = aggregate.events.iter().map(|e| e.record.title).collect();
    assert_eq!(titles, vec!["standup", "1:1", "lunch n learn"]);

    // Feed the timed events through the layout engine.
    let mut attrs = vec![LayoutAttrs::default(); aggregate.events.len()];
    {
        let mut layout = OverlapLayout::new();
        for (event, target) in aggregate.events.iter().zip(attrs.iter_mut()) {
            layout.add_item(event.interval, target);
        }
        layout.compute_layout();
        assert_eq!(layout.spans().len(), 2);
    }

    // standup and 1:1 split the width; the solo event takes it all.
    assert!((attrs[0].width - 50.0).abs() < 1e-9);
    assert_eq!(attrs[0].leading_offset, 0.0);
    assert!(attrs[0].has_overlaps);
    assert!((attrs[1].width - 50.0).abs() < 1e-9);
    assert!((attrs[1].leading_offset - 50.0).abs() < 1e-9);
    assert!((attrs[2].width - 100.0).abs() < 1e-9);
    assert!(!attrs[2].has_overlaps);
}

#[tokio::test(start_paused = true)]
async fn test_readiness_without_waiting_for_timer() {
    let store = MemoryStore::new();
    store.add(iv((9, 0), (10, 0)), "standup");

    let aggregator = DayAggregator::new(Arc::clone(&store));
    aggregator.subscribe(at(12, 0), |_| {});

    // recompute_now makes the first paint deterministic.
    let aggregate = aggregator.recompute_now(at(12, 0)).await.unwrap();
    assert_eq!(aggregate.amount, 1);
    assert_eq!(aggregate.events[0].record.title, "standup");
}
