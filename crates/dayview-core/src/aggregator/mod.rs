//! Day-scoped change aggregation.
//!
//! This module provides the stateful half of the day view:
//! - Per-day subscriptions with ordered fan-out
//! - Debounced recomputation (trailing edge, reset on retrigger) so a burst
//!   of store notifications costs one recompute
//! - A last-known-good cache handed synchronously to late subscribers
//!
//! All state lives in an explicit [`DayAggregator`] instance keyed by
//! [`DayKey`]; there are no module-level maps and no singletons. Timer
//! tasks are spawned on the ambient Tokio runtime, so every subscription
//! entry point must be called from within one.

mod result;
mod store;


pub use result::{AggregateResult, EventRecord};
pub use store::{ChangeNotifier, ObserverToken, TimeStore};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::day::DayKey;

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Debounce quiet period between an external change notification and
    /// the recompute it triggers. Overridable mainly for deterministic
    /// tests.
    pub quiet_period: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(50),
        }
    }
}

/// Identifies one registered subscriber callback.
///
/// Closures have no usable identity in Rust, so `subscribe` hands out a
/// token and `unsubscribe` takes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<R> = Arc<dyn Fn(&Arc<AggregateResult<R>>) + Send + Sync>;

/// Everything the aggregator tracks for one subscribed day.
struct DayRecord<R> {
    /// Callbacks in subscription order.
    subscribers: Vec<(SubscriptionId, Callback<R>)>,
    /// Store observer covering the day's span, once registration has
    /// completed.
    observer: Option<ObserverToken>,
    /// Debounce timer for the next recompute, if one is armed.
    pending: Option<JoinHandle<()>>,
    /// Stamp of the most recently armed recompute. A cycle only commits
    /// when its stamp is still current, so aborted or superseded timers can
    /// never publish.
    generation: u64,
    /// Last-known-good result.
    cached: Option<Arc<AggregateResult<R>>>,
}

struct State<R> {
    days: HashMap<DayKey, DayRecord<R>>,
    next_subscription: u64,
    next_generation: u64,
}

struct Inner<S: TimeStore> {
    store: Arc<S>,
    config: AggregatorConfig,
    state: Mutex<State<S::Record>>,
}

/// Batches and caches per-day event sets from a [`TimeStore`] and fans
/// results out to subscribers.
pub struct DayAggregator<S: TimeStore> {
    inner: Arc<Inner<S>>,
}

impl<S: TimeStore> Clone for DayAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TimeStore> DayAggregator<S> {
    /// Create an aggregator with the default quiet period.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, AggregatorConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(store: Arc<S>, config: AggregatorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                state: Mutex::new(State {
                    days: HashMap::new(),
                    next_subscription: 0,
                    next_generation: 0,
                }),
            }),
        }
    }

    /// Subscribe `callback` to the day containing `day`.
    ///
    /// The first subscriber for a day registers a store observer for the
    /// day's span and schedules the initial recompute through the regular
    /// debounce path. Later subscribers that find a cached result receive
    /// it synchronously before this returns.
    pub fn subscribe(
        &self,
        day: DateTime<Utc>,
        callback: impl Fn(&Arc<AggregateResult<S::Record>>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let key = DayKey::canonicalize(day);
        let callback: Callback<S::Record> = Arc::new(callback);

        let (id, cached, is_new) = {
            let mut guard = self.inner.state.lock().unwrap();
            let state = &mut *guard;
            state.next_subscription += 1;
            let id = SubscriptionId(state.next_subscription);

            match state.days.get_mut(&key) {
                Some(record) => {
                    record.subscribers.push((id, Arc::clone(&callback)));
                    (id, record.cached.clone(), false)
                }
                None => {
                    let mut record = DayRecord {
                        subscribers: vec![(id, Arc::clone(&callback))],
                        observer: None,
                        pending: None,
                        generation: 0,
                        cached: None,
                    };
                    // First subscriber: populate the cache through the same
                    // debounced path an external change would take.
                    Inner::arm_recompute(&self.inner, &mut record, &mut state.next_generation, key);
                    state.days.insert(key, record);
                    (id, None, true)
                }
            }
        };

        if is_new {
            // Registration happens with the lock released, so a store that
            // fires the notifier synchronously from observe_time cannot
            // deadlock against the state mutex.
            let token = Inner::register_observer(&self.inner, key);
            let orphaned = {
                let mut state = self.inner.state.lock().unwrap();
                match state.days.get_mut(&key) {
                    Some(record) => {
                        record.observer = Some(token);
                        false
                    }
                    // Torn down before registration completed.
                    None => true,
                }
            };
            if orphaned {
                self.inner.store.remove_time_observer(token);
            }
        }

        // A late joiner is not starved until the next external change.
        if let Some(result) = cached {
            callback(&result);
        }
        id
    }

    /// Remove one subscription. The last subscriber for a day tears the
    /// whole day down: observer, pending timer, cache. Unknown days or ids
    /// are a no-op.
    pub fn unsubscribe(&self, day: DateTime<Utc>, id: SubscriptionId) {
        let key = DayKey::canonicalize(day);
        let removed = {
            let mut state = self.inner.state.lock().unwrap();
            let emptied = match state.days.get_mut(&key) {
                Some(record) => {
                    record.subscribers.retain(|(sid, _)| *sid != id);
                    record.subscribers.is_empty()
                }
                None => false,
            };
            if emptied {
                state.days.remove(&key).map(|record| (key, record))
            } else {
                None
            }
        };
        if let Some((key, record)) = removed {
            self.teardown(key, record);
        }
    }

    /// Tear down every subscribed day.
    pub fn unsubscribe_all(&self) {
        let drained: Vec<_> = {
            let mut state = self.inner.state.lock().unwrap();
            state.days.drain().collect()
        };
        for (key, record) in drained {
            self.teardown(key, record);
        }
    }

    /// Run one recompute cycle for `day` immediately, bypassing the
    /// debounce, and return the result from the cache.
    ///
    /// This is the readiness hook for callers that must not render from an
    /// empty cache: awaiting it after `subscribe` guarantees a populated
    /// result without relying on timer latency. Returns `None` when the day
    /// has no subscribers; returns the previous cache if resolution failed.
    pub async fn recompute_now(
        &self,
        day: DateTime<Utc>,
    ) -> Option<Arc<AggregateResult<S::Record>>> {
        let key = DayKey::canonicalize(day);
        let generation = {
            let mut guard = self.inner.state.lock().unwrap();
            let state = &mut *guard;
            let record = state.days.get_mut(&key)?;
            if let Some(pending) = record.pending.take() {
                pending.abort();
            }
            state.next_generation += 1;
            record.generation = state.next_generation;
            record.generation
        };

        Inner::recompute(Arc::clone(&self.inner), key, generation).await;

        let state = self.inner.state.lock().unwrap();
        state.days.get(&key).and_then(|record| record.cached.clone())
    }

    /// Release everything a day held: pending timer, store observer, cache.
    fn teardown(&self, key: DayKey, record: DayRecord<S::Record>) {
        log::debug!("day {key}: tearing down");
        if let Some(pending) = record.pending {
            pending.abort();
        }
        if let Some(observer) = record.observer {
            self.inner.store.remove_time_observer(observer);
        }
        // cached result drops with the record
    }
}

impl<S: TimeStore> Inner<S> {
    fn register_observer(inner: &Arc<Self>, key: DayKey) -> ObserverToken {
        let weak = Arc::downgrade(inner);
        let notifier = ChangeNotifier::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::on_external_change(&inner, key);
            }
        });
        inner.store.observe_time(&key.span(), notifier)
    }

    /// Entry point for store change notifications.
    fn on_external_change(inner: &Arc<Self>, key: DayKey) {
        let mut guard = inner.state.lock().unwrap();
        let state = &mut *guard;
        if let Some(record) = state.days.get_mut(&key) {
            Self::arm_recompute(inner, record, &mut state.next_generation, key);
        }
    }

    /// (Re)arm the debounce timer: trailing edge, reset on retrigger. At
    /// most one pending recompute exists per day at any time.
    fn arm_recompute(
        inner: &Arc<Self>,
        record: &mut DayRecord<S::Record>,
        next_generation: &mut u64,
        key: DayKey,
    ) {
        *next_generation += 1;
        record.generation = *next_generation;
        let generation = record.generation;

        if let Some(pending) = record.pending.take() {
            pending.abort();
        }

        let task_inner = Arc::clone(inner);
        let quiet = inner.config.quiet_period;
        record.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            Inner::recompute(task_inner, key, generation).await;
        }));
    }

    /// One full recompute cycle for `key`. Commits only if the day is still
    /// subscribed and `generation` is still current, so a cancelled or
    /// superseded cycle publishes nothing.
    async fn recompute(inner: Arc<Self>, key: DayKey, generation: u64) {
        // The span is re-derived from the key; any datetime handed to
        // subscribe() may have been reused by its caller since.
        let span = key.span();
        let busy = inner.store.query_cache(&span);
        let resolved = match inner.store.resolve_associated(busy).await {
            Ok(resolved) => resolved,
            Err(err) => {
                // Best effort: drop this cycle, keep the previous cache,
                // wait for the next trigger.
                log::warn!("day {key}: record resolution failed: {err}");
                return;
            }
        };

        let result = Arc::new(AggregateResult::assemble(&span, resolved));
        let subscribers: Vec<Callback<S::Record>> = {
            let mut state = inner.state.lock().unwrap();
            let Some(record) = state.days.get_mut(&key) else {
                return; // torn down while resolving
            };
            if record.generation != generation {
                return; // superseded by a newer trigger
            }
            record.pending = None;
            record.cached = Some(Arc::clone(&result));
            record
                .subscribers
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect()
        };

        // Outside the lock so a callback may re-enter subscribe or
        // unsubscribe without deadlocking.
        for callback in &subscribers {
            callback(&result);
        }
    }
}
