//! Item module: the value type sorted by every algorithm.

/// Raw domain value carried by an [`Item`].
pub type Value = u16;

/// Sentinel marking an erased or invalid slot. Rendered as an unlit pixel.
pub const BLACK: Value = Value::MAX;

/// One orderable datum of the working buffer.
///
/// `Item` is deliberately neither `Copy` nor `Clone`: the only ways to
/// duplicate, move or compare one are the instrumented operations on
/// [`SortArray`](crate::array::SortArray), so no access can bypass the
/// event sink.
#[derive(Debug, PartialEq, Eq)]
pub struct Item {
    raw: Value,
}

impl Item {
    pub(crate) const fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub(crate) const fn raw(&self) -> Value {
        self.raw
    }

    pub(crate) fn set_raw(&mut self, raw: Value) {
        self.raw = raw;
    }

    /// Leaves `BLACK` behind and returns the previous value.
    pub(crate) fn erase(&mut self) -> Value {
        std::mem::replace(&mut self.raw, BLACK)
    }

    /// True if this slot holds the erased sentinel.
    pub fn is_black(&self) -> bool {
        self.raw == BLACK
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new(BLACK)
    }
}

/// Returns the raw values of a buffer without emitting any event.
///
/// Intended for assertions and reports after a run has finished.
pub fn values_of(items: &[Item]) -> Vec<Value> {
    items.iter().map(Item::raw).collect()
}
