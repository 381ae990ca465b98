//! Interface to the external time-indexed store.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::StoreError;
use crate::interval::Interval;

/// Store-assigned identifier for a registered time observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub u64);

/// Handle the store fires whenever data intersecting an observed span
/// changes.
///
/// Cloneable and cheap. Firing after the observing day has been torn down
/// is harmless: the notifier holds only a weak reference back to the
/// aggregator.
#[derive(Clone)]
pub struct ChangeNotifier {
    inner: Arc<dyn Fn() + Send + Sync>,
}

impl ChangeNotifier {
    pub(crate) fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Signal that data in the observed span changed.
    pub fn notify(&self) {
        (self.inner)()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeNotifier")
    }
}

/// The external time-indexed store the aggregator reads from.
///
/// Implemented elsewhere; the aggregator only depends on this seam.
pub trait TimeStore: Send + Sync + 'static {
    /// The store's record type. Records stay owned by the store side and
    /// flow through the aggregator behind `Arc`.
    type Record: Send + Sync + 'static;

    /// Register interest in changes intersecting `span`.
    ///
    /// `on_change` may be fired from any context, including synchronously
    /// from inside `observe_time` itself; the aggregator never holds its
    /// own lock while calling into the store.
    fn observe_time(&self, span: &Interval, on_change: ChangeNotifier) -> ObserverToken;

    /// Drop a previously registered observer. Unknown tokens are a no-op.
    fn remove_time_observer(&self, token: ObserverToken);

    /// Cheap synchronous lookup: cached busy intervals intersecting `span`.
    fn query_cache(&self, span: &Interval) -> Vec<Interval>;

    /// Resolve busy intervals into full records.
    fn resolve_associated(
        &self,
        intervals: Vec<Interval>,
    ) -> impl Future<Output = Result<Vec<(Interval, Arc<Self::Record>)>, StoreError>> + Send;
}
