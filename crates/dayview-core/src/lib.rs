//! # Dayview Core Library
//!
//! This library turns a stream of raw, possibly out-of-order calendar
//! change notifications into a conflict-free visual layout for a single
//! day. It is the algorithmic core behind a day view; storage, recurrence
//! expansion, timezone math and painting all live elsewhere and plug in
//! through the seams defined here.
//!
//! ## Architecture
//!
//! - **Day Aggregator**: owns per-day subscription state; coalesces bursts
//!   of change notifications from an external [`TimeStore`] into one
//!   debounced recompute; caches the last good result and fans it out to
//!   subscribers in order
//! - **Overlap Layout Engine**: pure and synchronous; groups a day's timed
//!   events into conflict spans and packs each span into parallel columns,
//!   then writes width/offset percentages onto opaque render targets
//!
//! ## Key Components
//!
//! - [`DayAggregator`]: subscription, debounce and cache state machine
//! - [`OverlapLayout`]: conflict-span column packing
//! - [`Interval`]: validated half-open time range with the strict overlap test
//! - [`DayKey`]: immutable canonical identifier for one calendar day

pub mod aggregator;
pub mod day;
pub mod error;
pub mod interval;
pub mod layout;

pub use aggregator::{
    AggregateResult, AggregatorConfig, ChangeNotifier, DayAggregator, EventRecord, ObserverToken,
    SubscriptionId, TimeStore,
};
pub use day::{is_all_day, DayKey};
pub use error::{InvalidIntervalError, StoreError};
pub use interval::Interval;
pub use layout::{ColumnSlot, ConflictSpan, LayoutAttrs, OverlapLayout, RenderTarget};
