//! Conflict spans and greedy column packing.

use crate::interval::Interval;

/// Lane-sharing test for column packing. Unlike span grouping, touching
/// counts: chained events that merely abut still get separate lanes, so a
/// packed cluster reads as one block of parallel columns.
fn blocks(a: &Interval, b: &Interval) -> bool {
    a.end().min(b.end()) >= a.start().max(b.start())
}

/// One item's seat inside a conflict span, by index into the engine's
/// sorted item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlot {
    pub item: usize,
    pub interval: Interval,
}

/// A group of temporally related items packed into columns together.
///
/// Membership is decided against the span's cumulative bounding interval,
/// not a true per-pair overlap graph: a chain A-B-C where only adjacent
/// pairs overlap still lands in a single span once the bounding interval
/// has grown over all three. This over-merging is kept intentionally for
/// compatibility with existing day views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSpan {
    bounding: Interval,
    members: Vec<ColumnSlot>,
    columns: Vec<Vec<ColumnSlot>>,
}

impl ConflictSpan {
    pub(crate) fn new(slot: ColumnSlot) -> Self {
        Self {
            bounding: slot.interval,
            members: vec![slot],
            columns: Vec::new(),
        }
    }

    /// The smallest interval covering every member.
    pub fn bounding(&self) -> Interval {
        self.bounding
    }

    /// Whether this span claims `interval` (strict test against the
    /// bounding interval; touching is not enough).
    pub(crate) fn absorbs(&self, interval: &Interval) -> bool {
        self.bounding.overlaps(interval)
    }

    pub(crate) fn push(&mut self, slot: ColumnSlot) {
        self.bounding = self.bounding.union(&slot.interval);
        self.members.push(slot);
    }

    /// Rebuild columns from scratch: each member goes to the first column
    /// where it blocks none of the occupants, in member (sorted) order.
    pub(crate) fn pack_columns(&mut self) {
        self.columns.clear();
        for slot in &self.members {
            let seat = self
                .columns
                .iter_mut()
                .find(|col| col.iter().all(|s| !blocks(&s.interval, &slot.interval)));
            match seat {
                Some(col) => col.push(*slot),
                None => self.columns.push(vec![*slot]),
            }
        }
    }

    /// Number of parallel columns needed by this span.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Packed columns, each an ordered list of slots.
    pub fn columns(&self) -> &[Vec<ColumnSlot>] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
