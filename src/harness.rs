//! Sort harness: runs algorithms off-strip and checks the identity oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithms::Algorithm;
use crate::array::SortArray;
use crate::cancel::CancelToken;
use crate::device::OutputDevice;
use crate::item::{values_of, Item, Value};
use crate::render::Renderer;
use crate::sink::{EventLog, EventSink, NullSink};

/// Result of one harnessed run.
#[derive(Debug, Clone)]
pub struct HarnessRun {
    pub values: Vec<Value>,
    pub log: EventLog,
}

impl HarnessRun {
    /// True if the buffer holds `0..N` in order.
    pub fn is_identity(&self) -> bool {
        is_identity(&self.values)
    }
}

pub fn is_identity(values: &[Value]) -> bool {
    values.iter().enumerate().all(|(i, &v)| usize::from(v) == i)
}

/// Drives algorithms over seeded shuffles without a device.
#[derive(Debug)]
pub struct SortHarness {
    rng: StdRng,
    cancel: CancelToken,
}

impl SortHarness {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Uniform permutation of `0..n`.
    pub fn shuffled(&mut self, n: usize) -> Vec<Value> {
        let mut values: Vec<Value> = (0..n).map(|v| v as Value).collect();
        for i in (1..n).rev() {
            let j = self.rng.random_range(0..=i);
            values.swap(i, j);
        }
        values
    }

    fn sort_into(&self, algorithm: &Algorithm, values: &[Value], sink: &mut dyn EventSink) -> Vec<Value> {
        let mut items: Vec<Item> = values.iter().map(|&v| Item::new(v)).collect();
        (algorithm.run)(&mut SortArray::new(&mut items, sink, &self.cancel));
        values_of(&items)
    }

    /// Sorts `values` unpaced and returns the final buffer.
    pub fn sort_unpaced(&self, algorithm: &Algorithm, values: &[Value]) -> Vec<Value> {
        self.sort_into(algorithm, values, &mut NullSink)
    }

    /// Sorts `values` and records every event.
    pub fn sort_logged(&self, algorithm: &Algorithm, values: &[Value]) -> HarnessRun {
        let mut log = EventLog::new();
        let values = self.sort_into(algorithm, values, &mut log);
        HarnessRun { values, log }
    }

    /// Sorts `values` through a renderer, as a strip would see it.
    pub fn sort_rendered<D: OutputDevice>(
        &self,
        algorithm: &Algorithm,
        values: &[Value],
        renderer: &mut Renderer<D>,
    ) -> Vec<Value> {
        self.sort_into(algorithm, values, renderer)
    }

    /// Shuffles `0..n`, sorts it and records every event.
    pub fn run_shuffled(&mut self, algorithm: &Algorithm, n: usize) -> HarnessRun {
        let values = self.shuffled(n);
        self.sort_logged(algorithm, &values)
    }
}
