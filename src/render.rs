//! Render module: the pacing sink that drives an output device.
//!
//! Every event becomes a "flash": the touched positions are painted at a
//! boosted intensity, the device is asked to transmit, the thread sleeps
//! for one pacing step and the positions are painted back at normal
//! intensity.
//!
//! The signed delay selects the mode:
//! - `delay >= 0`: direct mode. Each flash transmits (if the device is idle),
//!   sleeps once and restores immediately.
//! - `delay < 0`: frame-drop mode with `drop = -delay`. Flashes still paint
//!   high immediately but restoring is deferred into a ring. Every `drop`
//!   flashes the ring is restored in record order, one transmit is requested
//!   and one pacing step is taken.
//!
//! Two-position flashes always restore the second position first.

// IMPORTANT: Keep invariant logging out of this module; flash paths run once per event.

use std::time::Duration;

use tracing::debug;

use crate::color::{hsv, value_to_hue, Color};
use crate::config::PacingConfig;
use crate::device::OutputDevice;
use crate::item::{Item, BLACK};
use crate::sink::{EventSink, Slot};
use crate::telemetry::Telemetry;

/// Ring capacity. Larger frame drops are clamped.
pub const MAX_FRAME_DROP: usize = 256;

/// Longest single sleep; longer pacing steps are split.
const SLEEP_CHUNK_US: u64 = 100_000;

/// One deferred restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flash {
    One(usize),
    Two(usize, usize),
}

/// Counters describing what the renderer asked of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Flashes with delay, one per paced access or comparison.
    pub flashes: usize,
    /// Transmit requests issued.
    pub transmits: usize,
    /// Transmits skipped because the device was busy.
    pub busy_skips: usize,
    /// Pacing steps taken.
    pub steps: usize,
    /// Full repaints forced by an intensity change.
    pub repaints: usize,
    /// Total sleep requested, in microseconds, after delay factor scaling.
    pub slept_us: u64,
}

/// Pacing sink that owns the output device.
#[derive(Debug)]
pub struct Renderer<D: OutputDevice> {
    device: D,
    delay_time: i32,
    delay_factor: u32,
    flash_boost_percent: u32,
    frame_drop: usize,
    frame_pos: usize,
    pending: Vec<Flash>,
    intensity_last: u8,
    counter: usize,
    enable_count: bool,
    stats: RenderStats,
    telemetry: Telemetry,
}

impl<D: OutputDevice> Renderer<D> {
    pub fn new(device: D, config: &PacingConfig) -> Self {
        let intensity_last = device.intensity();
        let mut renderer = Self {
            device,
            delay_time: 0,
            delay_factor: config.delay_factor,
            flash_boost_percent: config.flash_boost_percent,
            frame_drop: 0,
            frame_pos: 0,
            pending: Vec::new(),
            intensity_last,
            counter: 0,
            enable_count: config.count_comparisons,
            stats: RenderStats::default(),
            telemetry: Telemetry::default(),
        };
        renderer.apply_delay_time(config.delay_us);
        renderer
    }

    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry_mut(&mut self) -> &mut Telemetry {
        &mut self.telemetry
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn delay_time(&self) -> i32 {
        self.delay_time
    }

    /// Events coalesced into one frame, or 0 in direct mode.
    pub fn frame_drop(&self) -> usize {
        self.frame_drop
    }

    /// Flashes waiting for their restore.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn reset_counter(&mut self) {
        self.counter = 0;
    }

    pub fn enable_count(&self) -> bool {
        self.enable_count
    }

    pub fn set_enable_count(&mut self, enable_count: bool) {
        self.enable_count = enable_count;
    }

    /// Per-mille scale applied to every positive sleep.
    pub fn set_delay_factor(&mut self, delay_factor: u32) {
        self.delay_factor = delay_factor;
    }

    pub fn delay_factor(&self) -> u32 {
        self.delay_factor
    }

    /// Switch pacing. Pending restores are flushed first so no position
    /// is left at high intensity.
    pub fn set_delay_time(&mut self, view: &[Item], delay_time: i32) {
        self.flush(view);
        self.apply_delay_time(delay_time);
        debug!(delay_time, frame_drop = self.frame_drop, "pacing changed");
    }

    fn apply_delay_time(&mut self, delay_time: i32) {
        self.delay_time = delay_time;
        if delay_time < 0 {
            self.frame_drop = (delay_time.unsigned_abs() as usize).min(MAX_FRAME_DROP);
            self.frame_pos = self.frame_drop - 1;
        } else {
            self.frame_drop = 0;
            self.frame_pos = 0;
        }
        self.pending.clear();
        self.pending.reserve(self.frame_drop);
    }

    /// Restore every pending flash, take one pacing step and transmit.
    pub fn flush(&mut self, view: &[Item]) {
        self.restore_pending(view);
        if self.frame_drop > 0 {
            self.frame_pos = self.frame_drop - 1;
        }
        self.yield_delay(view);
        self.transmit();
    }

    /// Paint every position at normal intensity.
    pub fn repaint(&mut self, view: &[Item]) {
        for i in 0..view.len() {
            self.flash_low(view, i);
        }
    }

    /// Sleep for `micros` (if positive) and run the per-step bookkeeping.
    pub fn yield_delay_micros(&mut self, view: &[Item], micros: i64) {
        if micros > 0 {
            let mut remain = micros as u64;
            self.stats.slept_us += remain;
            while remain > SLEEP_CHUNK_US {
                std::thread::sleep(Duration::from_micros(SLEEP_CHUNK_US));
                remain -= SLEEP_CHUNK_US;
            }
            std::thread::sleep(Duration::from_micros(remain));
        }
        self.stats.steps += 1;
        self.telemetry.step();

        let intensity = self.device.intensity();
        if intensity != self.intensity_last {
            self.intensity_last = intensity;
            self.stats.repaints += 1;
            self.repaint(view);
        }
    }

    /// One pacing step at the current delay.
    pub fn yield_delay(&mut self, view: &[Item]) {
        if self.delay_time < 0 {
            self.yield_delay_micros(view, i64::from(self.delay_time));
        } else {
            let scaled = i64::from(self.delay_time) * i64::from(self.delay_factor) / 1000;
            self.yield_delay_micros(view, scaled);
        }
    }

    pub(crate) fn announce(&mut self, name: &str) {
        self.telemetry.announce(name);
    }

    fn transmit(&mut self) {
        self.device.begin_transmit();
        self.stats.transmits += 1;
    }

    fn transmit_if_idle(&mut self) {
        if self.device.is_busy() {
            self.stats.busy_skips += 1;
        } else {
            self.transmit();
        }
    }

    fn increment_counter(&mut self) {
        if self.enable_count {
            self.counter += 1;
        }
        self.telemetry.count(self.counter);
    }

    fn low_color(&self, view: &[Item], i: usize) -> Color {
        let value = view[i].raw();
        if value == BLACK {
            Color::BLACK
        } else {
            let hue = value_to_hue(u32::from(value), view.len());
            hsv(hue, 255, self.device.intensity())
        }
    }

    fn high_color(&self, view: &[Item], i: usize) -> Color {
        let boosted = u32::from(self.device.intensity()) * self.flash_boost_percent / 100;
        let high = boosted.min(255) as u8;
        let value = view[i].raw();
        if value == BLACK {
            Color::gray(high)
        } else {
            let hue = value_to_hue(u32::from(value), view.len());
            hsv(hue, 255, high).with_white(high)
        }
    }

    fn flash_low(&mut self, view: &[Item], i: usize) {
        if i < view.len() {
            let color = self.low_color(view, i);
            self.device.set_pixel(i, color);
        }
    }

    fn flash_high(&mut self, view: &[Item], i: usize) {
        if i < view.len() {
            let color = self.high_color(view, i);
            self.device.set_pixel(i, color);
        }
    }

    fn restore(&mut self, view: &[Item], flash: Flash) {
        match flash {
            Flash::One(i) => self.flash_low(view, i),
            Flash::Two(i, j) => {
                self.flash_low(view, j);
                self.flash_low(view, i);
            }
        }
    }

    fn restore_pending(&mut self, view: &[Item]) {
        let pending = std::mem::take(&mut self.pending);
        for &flash in &pending {
            self.restore(view, flash);
        }
        // Reuse the allocation.
        self.pending = pending;
        self.pending.clear();
    }

    fn defer(&mut self, view: &[Item], flash: Flash) {
        self.pending.push(flash);
        if self.frame_pos == 0 {
            self.transmit_if_idle();
            self.restore_pending(view);
            self.frame_pos = self.frame_drop - 1;
            self.yield_delay(view);
        } else {
            self.frame_pos -= 1;
        }
    }

    fn flash(&mut self, view: &[Item], flash: Flash) {
        self.stats.flashes += 1;
        match flash {
            Flash::One(i) => self.flash_high(view, i),
            Flash::Two(i, j) => {
                self.flash_high(view, i);
                self.flash_high(view, j);
            }
        }
        if self.frame_drop == 0 {
            self.transmit_if_idle();
            self.yield_delay(view);
            self.restore(view, flash);
        } else {
            self.defer(view, flash);
        }
    }
}

impl<D: OutputDevice> EventSink for Renderer<D> {
    fn on_access(&mut self, view: &[Item], slot: Slot, with_delay: bool) {
        if with_delay {
            if let Some(v) = slot.value_in(view) {
                self.telemetry.sound(v);
            }
        }
        let Some(i) = slot.position(view.len()) else {
            return;
        };
        if with_delay {
            self.flash(view, Flash::One(i));
        } else {
            self.flash_low(view, i);
        }
    }

    fn on_comparison(&mut self, view: &[Item], a: Slot, b: Slot) {
        self.increment_counter();
        for slot in [a, b] {
            if let Some(v) = slot.value_in(view) {
                self.telemetry.sound(v);
            }
        }
        match (a.position(view.len()), b.position(view.len())) {
            (Some(i), Some(j)) => self.flash(view, Flash::Two(i, j)),
            (Some(i), None) | (None, Some(i)) => self.flash(view, Flash::One(i)),
            (None, None) => {}
        }
    }

    fn on_counter_increment(&mut self) {
        self.increment_counter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryStrip;

    fn identity(n: usize) -> Vec<Item> {
        (0..n).map(|v| Item::new(v as u16)).collect()
    }

    fn renderer(n: usize, delay_us: i32) -> Renderer<MemoryStrip> {
        let config = PacingConfig {
            delay_us,
            ..PacingConfig::default()
        };
        Renderer::new(MemoryStrip::new(n), &config)
    }

    #[test]
    fn direct_flash_transmits_and_steps_once() {
        let view = identity(4);
        let mut r = renderer(4, 0);
        r.on_access(&view, Slot::At(1), true);
        r.on_comparison(&view, Slot::At(0), Slot::At(3));
        let stats = r.stats();
        assert_eq!(stats.flashes, 2);
        assert_eq!(stats.transmits, 2);
        assert_eq!(stats.steps, 2);
    }

    #[test]
    fn direct_flash_restores_low() {
        let view = identity(4);
        let mut r = renderer(4, 0);
        r.on_comparison(&view, Slot::At(0), Slot::At(2));
        let low0 = r.low_color(&view, 0);
        let low2 = r.low_color(&view, 2);
        assert_eq!(r.device().pixels()[0], low0);
        assert_eq!(r.device().pixels()[2], low2);
    }

    #[test]
    fn transmitted_frame_shows_high() {
        let view = identity(2);
        let mut r = renderer(2, 0);
        r.on_access(&view, Slot::At(1), true);
        let high = r.high_color(&view, 1);
        assert_eq!(r.device().shown()[1], high);
        assert_ne!(r.device().pixels()[1], high);
    }

    #[test]
    fn busy_device_skips_transmit() {
        let view = identity(2);
        let config = PacingConfig::default();
        let mut r = Renderer::new(MemoryStrip::new(2).with_busy_polls(1), &config);
        r.on_access(&view, Slot::At(0), true);
        r.on_access(&view, Slot::At(1), true);
        let stats = r.stats();
        assert_eq!(stats.transmits, 1);
        assert_eq!(stats.busy_skips, 1);
        assert_eq!(stats.steps, 2);
    }

    #[test]
    fn frame_drop_coalesces_transmits() {
        let view = identity(8);
        let mut r = renderer(8, -4);
        for i in 0..10 {
            r.on_access(&view, Slot::At(i % 8), true);
        }
        let stats = r.stats();
        assert_eq!(stats.flashes, 10);
        assert_eq!(stats.transmits, 2);
        assert_eq!(stats.steps, 2);
        assert_eq!(r.pending(), 2);
    }

    #[test]
    fn frame_drop_defers_restore_until_frame() {
        let view = identity(4);
        let mut r = renderer(4, -2);
        r.on_access(&view, Slot::At(1), true);
        let high = r.high_color(&view, 1);
        assert_eq!(r.device().pixels()[1], high);
        r.on_access(&view, Slot::At(2), true);
        let low1 = r.low_color(&view, 1);
        assert_eq!(r.device().pixels()[1], low1);
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn delay_change_flushes_pending() {
        let view = identity(4);
        let mut r = renderer(4, -8);
        r.on_access(&view, Slot::At(3), true);
        assert_eq!(r.pending(), 1);
        r.set_delay_time(&view, 0);
        assert_eq!(r.pending(), 0);
        let low3 = r.low_color(&view, 3);
        assert_eq!(r.device().pixels()[3], low3);
        assert_eq!(r.frame_drop(), 0);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let view = identity(3);
        let mut r = renderer(3, 0);
        r.on_access(&view, Slot::At(3), true);
        r.on_access(&view, Slot::At(usize::MAX), false);
        r.on_comparison(&view, Slot::At(9), Slot::Scratch(1));
        assert_eq!(r.device().writes, 0);
        assert_eq!(r.stats().transmits, 0);
        assert_eq!(r.counter(), 1);
    }

    #[test]
    fn one_sided_comparison_flashes_in_range_side() {
        let view = identity(3);
        let mut r = renderer(3, 0);
        r.on_comparison(&view, Slot::Scratch(0), Slot::At(2));
        assert_eq!(r.stats().flashes, 1);
        assert_eq!(r.device().writes, 2);
    }

    #[test]
    fn counting_can_be_disabled() {
        let view = identity(2);
        let mut r = renderer(2, -4);
        r.on_comparison(&view, Slot::At(0), Slot::At(1));
        r.on_counter_increment();
        assert_eq!(r.counter(), 2);
        r.set_enable_count(false);
        r.on_comparison(&view, Slot::At(0), Slot::At(1));
        assert_eq!(r.counter(), 2);
    }

    #[test]
    fn intensity_change_forces_repaint() {
        let view = identity(3);
        let mut r = renderer(3, 0);
        r.device_mut().set_intensity(10);
        let writes_before = r.device().writes;
        r.on_access(&view, Slot::At(0), true);
        assert_eq!(r.stats().repaints, 1);
        // high + full repaint + restore
        assert_eq!(r.device().writes - writes_before, 1 + 3 + 1);
        assert_eq!(r.device().pixels()[2], hsv(value_to_hue(2, 3), 255, 10));
    }

    #[test]
    fn black_renders_off_and_flashes_gray() {
        let view = vec![Item::new(BLACK)];
        let r = renderer(1, 0);
        assert_eq!(r.low_color(&view, 0), Color::BLACK);
        // default intensity 64 boosted by 200%
        assert_eq!(r.high_color(&view, 0), Color::gray(128));
    }

    #[test]
    fn boost_is_capped() {
        let view = identity(1);
        let config = PacingConfig {
            flash_boost_percent: 1000,
            ..PacingConfig::default()
        };
        let r = Renderer::new(MemoryStrip::new(1).with_intensity(200), &config);
        assert_eq!(r.high_color(&view, 0).w, 255);
    }

    #[test]
    fn delay_factor_scales_sleep() {
        let view = identity(4);
        for factor in [0u32, 1000, 3000] {
            let mut r = renderer(4, 100);
            r.set_delay_factor(factor);
            assert_eq!(r.delay_factor(), factor);
            for i in 0..5 {
                r.on_access(&view, Slot::At(i % 4), true);
            }
            assert_eq!(r.stats().steps, 5);
            assert_eq!(r.stats().slept_us, 5 * 100 * u64::from(factor) / 1000, "factor {factor}");
        }
    }

    #[test]
    fn frame_drop_never_sleeps() {
        let view = identity(4);
        let mut r = renderer(4, -2);
        r.set_delay_factor(5000);
        for i in 0..8 {
            r.on_access(&view, Slot::At(i % 4), true);
        }
        assert_eq!(r.stats().steps, 4);
        assert_eq!(r.stats().slept_us, 0);
    }

    #[test]
    fn sound_hook_skips_unpaced_accesses() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let view = identity(4);
        let heard = Rc::new(RefCell::new(Vec::new()));
        let h = heard.clone();
        let mut r = renderer(4, -4)
            .with_telemetry(Telemetry::new().on_access_sound(move |v| h.borrow_mut().push(v)));
        r.on_access(&view, Slot::At(2), false);
        assert!(heard.borrow().is_empty());
        r.on_access(&view, Slot::At(1), true);
        r.on_access(&view, Slot::Scratch(3), true);
        r.on_comparison(&view, Slot::At(0), Slot::Scratch(2));
        assert_eq!(*heard.borrow(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn step_hook_fires_once_per_step() {
        use std::cell::Cell;
        use std::rc::Rc;

        let view = identity(4);
        let steps = Rc::new(Cell::new(0usize));
        let s = steps.clone();
        let mut r =
            renderer(4, 0).with_telemetry(Telemetry::new().on_delay_step(move || s.set(s.get() + 1)));
        r.on_access(&view, Slot::At(0), true);
        r.on_comparison(&view, Slot::At(1), Slot::At(2));
        r.flush(&view);
        assert_eq!(steps.get(), 3);
        assert_eq!(r.stats().steps, 3);
    }

    #[test]
    fn huge_frame_drop_is_clamped() {
        let r = renderer(1, i32::MIN);
        assert_eq!(r.frame_drop(), MAX_FRAME_DROP);
    }
}
