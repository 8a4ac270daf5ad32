//! Sink module: receivers for access and comparison events.
//!
//! Every instrumented operation on a [`SortArray`](crate::array::SortArray)
//! is reported to exactly one sink. A sink sees the current buffer as a
//! read-only view so it can derive colors without owning the data.

use crate::item::{Item, Value};

/// Where an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A position in the working buffer. May be out of range; sinks must
    /// ignore positions at or beyond the buffer length.
    At(usize),
    /// A temporary held outside the buffer, with its current value.
    Scratch(Value),
}

impl Slot {
    /// Returns the buffer position if this slot names one inside `len`.
    pub fn position(self, len: usize) -> Option<usize> {
        match self {
            Slot::At(i) if i < len => Some(i),
            _ => None,
        }
    }

    /// Value currently held by this slot, if it can be resolved.
    pub fn value_in(self, view: &[Item]) -> Option<Value> {
        match self {
            Slot::At(i) => view.get(i).map(Item::raw),
            Slot::Scratch(v) => Some(v),
        }
    }
}

/// Receiver of instrumentation events.
///
/// Implementations must not panic: a misbehaving sink may drop the visual
/// effect but must never disturb the algorithm.
pub trait EventSink {
    /// A slot was constructed, assigned, moved or read.
    fn on_access(&mut self, view: &[Item], slot: Slot, with_delay: bool);

    /// Two slots were compared.
    fn on_comparison(&mut self, view: &[Item], a: Slot, b: Slot);

    /// An explicit comparison-counter bump without a visual comparison.
    fn on_counter_increment(&mut self);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_access(&mut self, view: &[Item], slot: Slot, with_delay: bool) {
        (**self).on_access(view, slot, with_delay)
    }

    fn on_comparison(&mut self, view: &[Item], a: Slot, b: Slot) {
        (**self).on_comparison(view, a, b)
    }

    fn on_counter_increment(&mut self) {
        (**self).on_counter_increment()
    }
}

/// Discards every event. Runs an algorithm unpaced.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_access(&mut self, _view: &[Item], _slot: Slot, _with_delay: bool) {}
    fn on_comparison(&mut self, _view: &[Item], _a: Slot, _b: Slot) {}
    fn on_counter_increment(&mut self) {}
}

/// A recorded instrumentation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Access { slot: Slot, with_delay: bool },
    Comparison { a: Slot, b: Slot },
    CounterIncrement,
}

/// Records every event in arrival order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of access events that carried a delay.
    pub fn delayed_accesses(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Access { with_delay: true, .. }))
            .count()
    }

    /// Number of access events that bypassed pacing.
    pub fn undelayed_accesses(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Access { with_delay: false, .. }))
            .count()
    }

    pub fn comparisons(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Comparison { .. }))
            .count()
    }

    pub fn counter_increments(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::CounterIncrement))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventLog {
    fn on_access(&mut self, _view: &[Item], slot: Slot, with_delay: bool) {
        self.events.push(Event::Access { slot, with_delay });
    }

    fn on_comparison(&mut self, _view: &[Item], a: Slot, b: Slot) {
        self.events.push(Event::Comparison { a, b });
    }

    fn on_counter_increment(&mut self) {
        self.events.push(Event::CounterIncrement);
    }
}
