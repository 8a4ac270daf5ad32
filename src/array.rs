//! Array module: the instrumented view algorithms sort through.
//!
//! A [`SortArray`] borrows the working buffer, the active [`EventSink`] and
//! the run's [`CancelToken`] for the duration of one phase. Every operation
//! that constructs, assigns, moves or reads an [`Item`] reports exactly one
//! access event per touched slot, and every ordering operation reports
//! exactly one comparison event. The `*_direct` comparisons report nothing
//! and exist for bookkeeping passes that are conceptually a single step.
//!
//! Positions are plain indices. Indexing outside the buffer is an algorithm
//! bug and panics like slice indexing does.

use std::cmp::Ordering;

use crate::cancel::CancelToken;
use crate::item::{Item, Value};
use crate::sink::{EventSink, Slot};

/// One side of a comparison: a buffer position or a scratch item.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'b> {
    At(usize),
    Item(&'b Item),
}

impl From<usize> for Operand<'_> {
    fn from(i: usize) -> Self {
        Operand::At(i)
    }
}

impl<'b> From<&'b Item> for Operand<'b> {
    fn from(item: &'b Item) -> Self {
        Operand::Item(item)
    }
}

/// Instrumented working buffer.
pub struct SortArray<'a> {
    items: &'a mut [Item],
    sink: &'a mut dyn EventSink,
    cancel: CancelToken,
}

impl<'a> SortArray<'a> {
    pub fn new(items: &'a mut [Item], sink: &'a mut dyn EventSink, cancel: &CancelToken) -> Self {
        Self {
            items,
            sink,
            cancel: cancel.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True once cancellation was requested. Poll at most once per outer
    /// loop iteration.
    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn access(&mut self, slot: Slot, with_delay: bool) {
        self.sink.on_access(self.items, slot, with_delay);
    }

    fn resolve(&self, op: Operand<'_>) -> (Slot, Value) {
        match op {
            Operand::At(i) => (Slot::At(i), self.items[i].raw()),
            Operand::Item(item) => (Slot::Scratch(item.raw()), item.raw()),
        }
    }

    fn observe(&mut self, a: Operand<'_>, b: Operand<'_>) -> (Value, Value) {
        let (sa, va) = self.resolve(a);
        let (sb, vb) = self.resolve(b);
        self.sink.on_comparison(self.items, sa, sb);
        (va, vb)
    }

    // *** reads and construction

    /// Reads a value, paced like any other access.
    pub fn value<'b>(&mut self, x: impl Into<Operand<'b>>) -> Value {
        let (slot, v) = self.resolve(x.into());
        self.access(slot, true);
        v
    }

    /// Reads a value without pacing. Setup and validation only.
    pub fn value_no_delay(&mut self, i: usize) -> Value {
        let v = self.items[i].raw();
        self.access(Slot::At(i), false);
        v
    }

    /// Constructs a scratch item holding `raw`.
    pub fn scratch(&mut self, raw: Value) -> Item {
        self.access(Slot::Scratch(raw), true);
        Item::new(raw)
    }

    /// Copies the item at `i` out of the buffer.
    pub fn get(&mut self, i: usize) -> Item {
        let raw = self.items[i].raw();
        self.scratch(raw)
    }

    /// Copies a scratch item out again.
    pub fn duplicate(&mut self, item: &Item) -> Item {
        self.scratch(item.raw())
    }

    // *** writes

    /// Copy-assigns `item` into position `i`.
    pub fn set(&mut self, i: usize, item: &Item) {
        self.items[i].set_raw(item.raw());
        self.access(Slot::At(i), true);
    }

    /// Move-assigns `item` into position `i`.
    pub fn put(&mut self, i: usize, item: Item) {
        self.set(i, &item);
    }

    /// Moves the item out of position `i`, leaving the erased sentinel.
    /// The vacated position is reported so the gap becomes visible.
    pub fn take(&mut self, i: usize) -> Item {
        let raw = self.items[i].erase();
        self.access(Slot::At(i), true);
        Item::new(raw)
    }

    /// Copy-assigns position `src` into position `dst`.
    pub fn assign(&mut self, dst: usize, src: usize) {
        let raw = self.items[src].raw();
        self.items[dst].set_raw(raw);
        self.access(Slot::At(dst), true);
    }

    /// Swaps two positions; reports `i` then `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.items.swap(i, j);
        self.access(Slot::At(i), true);
        self.access(Slot::At(j), true);
    }

    pub fn increment(&mut self, i: usize) {
        let raw = self.items[i].raw().wrapping_add(1);
        self.items[i].set_raw(raw);
        self.access(Slot::At(i), true);
    }

    pub fn decrement(&mut self, i: usize) {
        let raw = self.items[i].raw().wrapping_sub(1);
        self.items[i].set_raw(raw);
        self.access(Slot::At(i), true);
    }

    // *** bypass delay

    /// Writes `raw` without pacing. Setup and teardown only.
    pub fn set_no_delay(&mut self, i: usize, raw: Value) {
        self.items[i].set_raw(raw);
        self.access(Slot::At(i), false);
    }

    /// Swaps without pacing. Setup only.
    pub fn swap_no_delay(&mut self, i: usize, j: usize) {
        self.items.swap(i, j);
        self.access(Slot::At(i), false);
        self.access(Slot::At(j), false);
    }

    // *** comparisons, one event each

    pub fn equal<'b>(&mut self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x == y
    }

    pub fn not_equal<'b>(&mut self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x != y
    }

    pub fn less<'b>(&mut self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x < y
    }

    pub fn less_equal<'b>(&mut self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x <= y
    }

    pub fn greater<'b>(&mut self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x > y
    }

    pub fn greater_equal<'b>(
        &mut self,
        a: impl Into<Operand<'b>>,
        b: impl Into<Operand<'b>>,
    ) -> bool {
        let (x, y) = self.observe(a.into(), b.into());
        x >= y
    }

    /// Three-way comparison; counts as a single comparison.
    pub fn compare<'b>(
        &mut self,
        a: impl Into<Operand<'b>>,
        b: impl Into<Operand<'b>>,
    ) -> Ordering {
        let (x, y) = self.observe(a.into(), b.into());
        x.cmp(&y)
    }

    // *** comparisons without sound, counting or delay

    pub fn equal_direct<'b>(&self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        self.resolve(a.into()).1 == self.resolve(b.into()).1
    }

    pub fn less_direct<'b>(&self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        self.resolve(a.into()).1 < self.resolve(b.into()).1
    }

    pub fn greater_direct<'b>(&self, a: impl Into<Operand<'b>>, b: impl Into<Operand<'b>>) -> bool {
        self.resolve(a.into()).1 > self.resolve(b.into()).1
    }

    /// Charges one comparison to the counter without flashing anything.
    pub fn increment_counter(&mut self) {
        self.sink.on_counter_increment();
    }
}
