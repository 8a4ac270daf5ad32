//! Engine module: owns the working buffer and drives one animation.
//!
//! A run moves through [`Phase::Setup`] (identity fill and shuffle),
//! [`Phase::Running`] (the algorithm), [`Phase::Settling`] (validation at a
//! fast frame drop with counting frozen) and [`Phase::Idle`] (hold, then
//! the run's pacing is restored).
//!
//! Only one engine may be alive per thread. The guard is released when the
//! engine is dropped.

use std::cell::Cell;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::algorithms::{self, Algorithm};
use crate::array::SortArray;
use crate::cancel::CancelToken;
use crate::config::{PacingConfig, ShowConfig};
use crate::device::OutputDevice;
use crate::error::EngineError;
use crate::invariant_ppt::{
    assert_invariant, DELAY_CHANGE_FLUSHED, IDENTITY_SETUP, SETTLE_COUNTER_FROZEN,
    SETTLE_MARKS_MISMATCH, SETTLE_RING_DRAINED, SHUFFLE_IS_PERMUTATION, SINGLE_ACTIVE_RUN,
    STRIP_LENGTH_VALID, TEARDOWN_RESTORES_PACING,
};
use crate::item::{values_of, Item, Value, BLACK};
use crate::render::{RenderStats, Renderer, MAX_FRAME_DROP};
use crate::telemetry::Telemetry;

thread_local! {
    static RUN_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Claim on the thread's single animation slot.
#[derive(Debug)]
struct RunGuard(());

impl RunGuard {
    fn acquire() -> Result<Self, EngineError> {
        RUN_ACTIVE.with(|active| {
            if active.replace(true) {
                Err(EngineError::RunAlreadyActive)
            } else {
                Ok(RunGuard(()))
            }
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        RUN_ACTIVE.with(|active| active.set(false));
    }
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Running,
    Settling,
    Idle,
}

/// Outcome of one complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub name: &'static str,
    /// Wall time of the running phase, pacing sleeps included.
    pub elapsed: Duration,
    pub comparisons: usize,
    /// Paced flashes issued while the algorithm ran.
    pub events: usize,
    /// Positions found out of place while settling.
    pub mismatches: usize,
    pub cancelled: bool,
}

impl RunReport {
    /// True when the algorithm finished and left the identity behind.
    pub fn is_clean(&self) -> bool {
        self.mismatches == 0 && !self.cancelled
    }
}

/// Pacing engine: working buffer, renderer and run state.
#[derive(Debug)]
pub struct PacingEngine<D: OutputDevice> {
    items: Vec<Item>,
    renderer: Renderer<D>,
    cancel: CancelToken,
    config: PacingConfig,
    rng: StdRng,
    phase: Phase,
    /// Delay and counting settings of the run, parked while settling.
    saved: Option<(i32, bool)>,
    _guard: RunGuard,
}

impl<D: OutputDevice> PacingEngine<D> {
    /// Creates an engine whose buffer spans the whole device.
    pub fn new(device: D, config: PacingConfig) -> Result<Self, EngineError> {
        let guard = RunGuard::acquire()?;
        assert_invariant(SINGLE_ACTIVE_RUN, true, "one engine per thread", None);

        let len = device.len();
        let max = usize::from(BLACK);
        if len == 0 || len > max {
            return Err(EngineError::InvalidLength { len, max });
        }
        assert_invariant(
            STRIP_LENGTH_VALID,
            len <= max,
            "every position has a value below the sentinel",
            None,
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let renderer = Renderer::new(device, &config);
        let mut items = Vec::with_capacity(len);
        items.resize_with(len, Item::default);

        debug!(len, delay_us = config.delay_us, "engine created");
        Ok(Self {
            items,
            renderer,
            cancel: CancelToken::new(),
            config,
            rng,
            phase: Phase::Idle,
            saved: None,
            _guard: guard,
        })
    }

    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        *self.renderer.telemetry_mut() = telemetry;
        self
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        self.renderer.telemetry_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Token that stops the current algorithm at its next poll point.
    /// A request sticks until the token is reset.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn values(&self) -> Vec<Value> {
        values_of(&self.items)
    }

    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }

    pub fn stats(&self) -> RenderStats {
        self.renderer.stats()
    }

    pub fn device(&self) -> &D {
        self.renderer.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.renderer.device_mut()
    }

    pub fn into_device(self) -> D {
        self.renderer.into_device()
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    fn array(&mut self) -> SortArray<'_> {
        SortArray::new(&mut self.items, &mut self.renderer, &self.cancel)
    }

    // *** pacing controls

    /// Changes the signed delay. Pending frame-drop restores are flushed.
    pub fn set_delay_time(&mut self, delay_us: i32) {
        self.renderer.set_delay_time(&self.items, delay_us);
        assert_invariant(
            DELAY_CHANGE_FLUSHED,
            self.renderer.pending() == 0,
            "no flash left pending across a delay change",
            None,
        );
        self.config.delay_us = delay_us;
    }

    pub fn set_delay_factor(&mut self, delay_factor: u32) {
        self.renderer.set_delay_factor(delay_factor);
        self.config.delay_factor = delay_factor;
    }

    pub fn set_enable_count(&mut self, enable: bool) {
        self.renderer.set_enable_count(enable);
        self.config.count_comparisons = enable;
    }

    // *** phases

    /// Paints the whole buffer with the erased sentinel.
    pub fn blank(&mut self) {
        let n = self.items.len();
        let mut a = self.array();
        for i in 0..n {
            a.set_no_delay(i, BLACK);
        }
        self.renderer.flush(&self.items);
    }

    /// Fills the buffer with the identity and shuffles it without pacing.
    pub fn randomize(&mut self) {
        self.set_phase(Phase::Setup);
        let n = self.items.len();
        {
            let mut a = SortArray::new(&mut self.items, &mut self.renderer, &self.cancel);
            for i in 0..n {
                a.set_no_delay(i, i as Value);
            }
        }
        assert_invariant(
            IDENTITY_SETUP,
            self.items.iter().enumerate().all(|(i, it)| usize::from(it.raw()) == i),
            "buffer holds 0..N in order",
            None,
        );

        {
            let mut a = SortArray::new(&mut self.items, &mut self.renderer, &self.cancel);
            for i in (1..n).rev() {
                let j = self.rng.random_range(0..=i);
                a.swap_no_delay(i, j);
            }
        }
        let mut seen = vec![false; n];
        for it in &self.items {
            if let Some(slot) = seen.get_mut(usize::from(it.raw())) {
                *slot = true;
            }
        }
        assert_invariant(
            SHUFFLE_IS_PERMUTATION,
            seen.iter().all(|&s| s),
            "shuffle keeps every value exactly once",
            None,
        );

        self.renderer.flush(&self.items);
    }

    /// Shuffles, sorts, settles and holds. Returns what happened.
    pub fn run(&mut self, algorithm: &Algorithm) -> RunReport {
        self.randomize();

        self.set_phase(Phase::Running);
        self.renderer.announce(algorithm.name);
        self.renderer.reset_counter();
        let flashes_before = self.renderer.stats().flashes;
        let start = Instant::now();
        (algorithm.run)(&mut self.array());
        let elapsed = start.elapsed();
        let events = self.renderer.stats().flashes - flashes_before;
        let comparisons = self.renderer.counter();
        let cancelled = self.cancel.is_cancelled();

        let mismatches = self.settle();
        self.hold();

        let report = RunReport {
            name: algorithm.name,
            elapsed,
            comparisons,
            events,
            mismatches,
            cancelled,
        };
        info!(
            algorithm = report.name,
            elapsed_ms = report.elapsed.as_millis() as u64,
            comparisons,
            events,
            mismatches,
            cancelled,
            "run finished"
        );
        report
    }

    /// Checks every position against its index at the settle frame drop,
    /// marking mismatches with the sentinel. Returns the mismatch count.
    pub fn settle(&mut self) -> usize {
        self.set_phase(Phase::Settling);
        let run_settings = (self.renderer.delay_time(), self.renderer.enable_count());
        self.saved.get_or_insert(run_settings);

        // clamped before the cast, so the negation cannot overflow
        let settle_drop = self.config.settle_frame_drop.clamp(1, MAX_FRAME_DROP as u32);
        let settle_delay = -(settle_drop as i32);
        self.renderer.set_delay_time(&self.items, settle_delay);
        assert_invariant(
            DELAY_CHANGE_FLUSHED,
            self.renderer.pending() == 0,
            "run flashes restored before settling",
            None,
        );
        self.renderer.set_enable_count(false);
        let counter_before = self.renderer.counter();

        let n = self.items.len();
        let mut mismatches = 0;
        {
            let mut a = self.array();
            for i in 0..n {
                let expected = a.scratch(i as Value);
                if a.not_equal(i, &expected) {
                    mismatches += 1;
                    let black = a.scratch(BLACK);
                    a.put(i, black);
                }
            }
        }
        self.renderer.flush(&self.items);

        assert_invariant(
            SETTLE_COUNTER_FROZEN,
            self.renderer.counter() == counter_before,
            "validation comparisons are not counted",
            None,
        );
        assert_invariant(
            SETTLE_RING_DRAINED,
            self.renderer.pending() == 0,
            "no position left at high intensity",
            None,
        );
        assert_invariant(
            SETTLE_MARKS_MISMATCH,
            self.items
                .iter()
                .enumerate()
                .all(|(i, it)| it.is_black() || usize::from(it.raw()) == i),
            "every position is its index or the sentinel",
            None,
        );

        if mismatches > 0 {
            warn!(mismatches, len = n, "buffer not sorted after run");
        }
        mismatches
    }

    /// Keeps the result on the strip for the hold time, then restores the
    /// run's delay and counting settings.
    pub fn hold(&mut self) {
        self.set_phase(Phase::Idle);
        let micros = i64::try_from(self.config.hold_ms.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.renderer.yield_delay_micros(&self.items, micros);

        if let Some((delay, count)) = self.saved.take() {
            self.renderer.set_delay_time(&self.items, delay);
            self.renderer.set_enable_count(count);
            assert_invariant(
                TEARDOWN_RESTORES_PACING,
                self.renderer.delay_time() == delay && self.renderer.enable_count() == count,
                "run pacing restored after hold",
                None,
            );
        }
    }
}

/// Runs one algorithm picked at random from `show.algorithms` (or from
/// every registered algorithm if that list is empty or names nothing
/// known), at its configured delay.
pub fn run_random_algorithm<D: OutputDevice>(
    engine: &mut PacingEngine<D>,
    show: &ShowConfig,
    rng: &mut impl Rng,
) -> RunReport {
    let mut pool: Vec<&'static Algorithm> = Vec::new();
    for name in &show.algorithms {
        match algorithms::find(name) {
            Some(algo) => pool.push(algo),
            None => warn!(name = name.as_str(), "unknown algorithm skipped"),
        }
    }
    if pool.is_empty() {
        pool.extend(algorithms::ALGORITHMS.iter());
    }

    let algo = pool[rng.random_range(0..pool.len())];
    engine.set_delay_time(show.delay_for(algo.name));
    engine.run(algo)
}
