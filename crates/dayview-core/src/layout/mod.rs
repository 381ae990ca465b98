//! Overlap-free column layout for a day's timed events.
//!
//! This module provides the pure, synchronous half of the day view:
//! - Groups overlapping events into conflict spans
//! - Packs each span's events into the fewest parallel columns
//! - Emits width/offset percentages and overlap flags onto render targets
//!
//! The engine never recomputes on its own. Callers batch `add_item` calls
//! and invoke [`OverlapLayout::compute_layout`] once per batch; computing
//! after every add would turn one `O(n log n + n*k)` pass into n of them.

mod span;

pub use span::{ColumnSlot, ConflictSpan};

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// Columns beyond this count mark a span as crowded.
const MANY_OVERLAPS_THRESHOLD: usize = 4;

/// Sink for the layout attributes of one event block.
///
/// Implementors decide what "leading edge" means: left for left-to-right
/// layouts, right for right-to-left ones. The engine only ever borrows a
/// target; it never owns or outlives one.
pub trait RenderTarget {
    /// Block width as a percentage of the container.
    fn set_width(&mut self, percent: f64);
    /// Distance from the container's leading edge, as a percentage.
    fn set_leading_offset(&mut self, percent: f64);
    /// The block shares its span with at least one other column.
    fn set_has_overlaps(&mut self, overlapping: bool);
    /// The span needs more than four columns.
    fn set_many_overlaps(&mut self, crowded: bool);
}

/// Plain value implementation of [`RenderTarget`] for callers that want the
/// computed attributes rather than side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutAttrs {
    pub width: f64,
    pub leading_offset: f64,
    pub has_overlaps: bool,
    pub many_overlaps: bool,
}

impl RenderTarget for LayoutAttrs {
    fn set_width(&mut self, percent: f64) {
        self.width = percent;
    }

    fn set_leading_offset(&mut self, percent: f64) {
        self.leading_offset = percent;
    }

    fn set_has_overlaps(&mut self, overlapping: bool) {
        self.has_overlaps = overlapping;
    }

    fn set_many_overlaps(&mut self, crowded: bool) {
        self.many_overlaps = crowded;
    }
}

/// A timed event awaiting placement: its interval plus the borrowed render
/// target its attributes land on.
struct PositionedItem<'a> {
    interval: Interval,
    target: &'a mut dyn RenderTarget,
}

/// Assigns non-overlapping display columns to temporally overlapping events.
///
/// Spans and columns are rebuilt from scratch on every
/// [`compute_layout`](Self::compute_layout) call; nothing is maintained
/// incrementally.
#[derive(Default)]
pub struct OverlapLayout<'a> {
    items: Vec<PositionedItem<'a>>,
    spans: Vec<ConflictSpan>,
}

impl<'a> OverlapLayout<'a> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Discard the item list and any spans from a previous computation.
    pub fn reset(&mut self) {
        self.items.clear();
        self.spans.clear();
    }

    /// Queue an item for the next computation. Never recomputes.
    pub fn add_item(&mut self, interval: Interval, target: &'a mut dyn RenderTarget) {
        self.items.push(PositionedItem { interval, target });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Conflict spans from the most recent computation.
    pub fn spans(&self) -> &[ConflictSpan] {
        &self.spans
    }

    /// Assign every queued item to a span and column, then write layout
    /// attributes to each item's render target.
    ///
    /// The item sort is stable, so calling this again without intervening
    /// `add_item`/`reset` reproduces the identical assignment.
    pub fn compute_layout(&mut self) {
        self.items.sort_by_key(|item| item.interval.start());

        // Span grouping via the cumulative bounding interval. See
        // `ConflictSpan` for why this can over-merge chained items.
        self.spans.clear();
        for (item, positioned) in self.items.iter().enumerate() {
            let slot = ColumnSlot {
                item,
                interval: positioned.interval,
            };
            match self.spans.iter_mut().find(|s| s.absorbs(&slot.interval)) {
                Some(existing) => existing.push(slot),
                None => self.spans.push(ConflictSpan::new(slot)),
            }
        }

        for span in &mut self.spans {
            span.pack_columns();
        }

        for span in &self.spans {
            let n_cols = span.column_count();
            let width = 100.0 / n_cols as f64;
            for (col_index, column) in span.columns().iter().enumerate() {
                let offset = col_index as f64 * width;
                for slot in column {
                    let target = &mut self.items[slot.item].target;
                    target.set_width(width);
                    target.set_leading_offset(offset);
                    target.set_has_overlaps(n_cols > 1);
                    target.set_many_overlaps(n_cols > MANY_OVERLAPS_THRESHOLD);
                }
            }
        }
    }
}
