//! Full runs through the pacing engine on an in-memory strip.

use std::cell::RefCell;
use std::rc::Rc;

use blinksort::algorithms::find;
use blinksort::color::{hsv, value_to_hue};
use blinksort::invariant_ppt::{
    contract_test, DELAY_CHANGE_FLUSHED, IDENTITY_SETUP, SETTLE_COUNTER_FROZEN,
    SETTLE_MARKS_MISMATCH, SETTLE_RING_DRAINED, SHUFFLE_IS_PERMUTATION, SINGLE_ACTIVE_RUN,
    STRIP_LENGTH_VALID, TEARDOWN_RESTORES_PACING,
};
use blinksort::{
    Color, EngineError, MemoryStrip, PacingConfig, PacingEngine, Telemetry, ALGORITHMS, BLACK,
};

fn config(seed: u64) -> PacingConfig {
    PacingConfig {
        seed: Some(seed),
        ..PacingConfig::unpaced()
    }
}

fn expected_low(values: &[u16], intensity: u8) -> Vec<Color> {
    values
        .iter()
        .map(|&v| {
            if v == BLACK {
                Color::BLACK
            } else {
                hsv(value_to_hue(u32::from(v), values.len()), 255, intensity)
            }
        })
        .collect()
}

#[test]
fn every_algorithm_runs_clean_and_leaves_nothing_high() {
    let mut engine = PacingEngine::new(MemoryStrip::new(48), config(21)).unwrap();
    for algo in ALGORITHMS {
        let report = engine.run(algo);
        assert!(report.is_clean(), "{report:?}");
        let values = engine.values();
        assert_eq!(engine.device().pixels(), expected_low(&values, 64).as_slice());
        assert_eq!(engine.device().shown(), engine.device().pixels());
    }
}

#[test]
fn settling_leaves_counter_alone() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut engine = PacingEngine::new(MemoryStrip::new(16), config(2))
        .unwrap()
        .with_telemetry(Telemetry::new().on_comparison_count(move |n| sink.borrow_mut().push(n)));

    let report = engine.run(find("Bubble Sort").unwrap());
    assert_eq!(engine.renderer().counter(), report.comparisons);

    // settle comparisons still report the frozen counter
    let history = seen.borrow();
    let last = *history.last().unwrap();
    assert_eq!(last, report.comparisons);
    assert!(history.len() > report.comparisons);
}

#[test]
fn hooks_fire_from_the_engine() {
    let names = Rc::new(RefCell::new(Vec::new()));
    let sounds = Rc::new(RefCell::new(0usize));
    let steps = Rc::new(RefCell::new(0usize));
    let (n, a, s) = (Rc::clone(&names), Rc::clone(&sounds), Rc::clone(&steps));
    let telemetry = Telemetry::new()
        .on_algorithm_name(move |name| n.borrow_mut().push(name.to_string()))
        .on_access_sound(move |_| *a.borrow_mut() += 1)
        .on_delay_step(move || *s.borrow_mut() += 1);
    let mut engine = PacingEngine::new(MemoryStrip::new(12), config(6))
        .unwrap()
        .with_telemetry(telemetry);

    // setup writes are unpaced and stay silent
    engine.randomize();
    assert_eq!(*sounds.borrow(), 0);
    assert!(names.borrow().is_empty());

    let report = engine.run(find("Selection Sort").unwrap());
    assert!(report.is_clean());
    assert_eq!(*names.borrow(), vec!["Selection Sort".to_string()]);
    assert!(*sounds.borrow() > 0);
    assert_eq!(*steps.borrow(), engine.stats().steps);
}

#[test]
fn settling_twice_changes_no_pixel() {
    let mut engine = PacingEngine::new(MemoryStrip::new(24), config(8)).unwrap();
    assert!(engine.run(find("Heap Sort").unwrap()).is_clean());
    let pixels = engine.device().pixels().to_vec();
    let shown = engine.device().shown().to_vec();

    assert_eq!(engine.settle(), 0);
    engine.hold();
    assert_eq!(engine.device().pixels(), pixels.as_slice());
    assert_eq!(engine.device().shown(), shown.as_slice());
}

#[test]
fn cancellation_is_caught_by_settling() {
    let mut engine = PacingEngine::new(MemoryStrip::new(40), config(13)).unwrap();
    engine.cancel_token().cancel();
    let report = engine.run(find("Cycle Sort").unwrap());
    assert!(report.cancelled);
    assert!(report.mismatches > 0);
    let values = engine.values();
    let black = values.iter().filter(|&&v| v == BLACK).count();
    assert_eq!(black, report.mismatches);
    assert_eq!(engine.device().pixels(), expected_low(&values, 64).as_slice());
}

#[test]
fn intensity_change_repaints_whole_strip() {
    let mut engine = PacingEngine::new(MemoryStrip::new(10), config(4)).unwrap();
    assert!(engine.run(find("Insertion Sort").unwrap()).is_clean());
    engine.device_mut().set_intensity(20);
    engine.set_delay_time(-1);
    let values = engine.values();
    assert_eq!(engine.device().pixels(), expected_low(&values, 20).as_slice());
    assert!(engine.stats().repaints >= 1);
}

#[test]
fn one_engine_per_thread() {
    let engine = PacingEngine::new(MemoryStrip::new(4), config(0)).unwrap();
    assert_eq!(
        PacingEngine::new(MemoryStrip::new(4), config(0)).unwrap_err(),
        EngineError::RunAlreadyActive
    );

    // other threads have their own slot
    let handle = std::thread::spawn(|| PacingEngine::new(MemoryStrip::new(4), config(0)).is_ok());
    assert!(handle.join().unwrap());

    drop(engine);
    assert!(PacingEngine::new(MemoryStrip::new(4), config(0)).is_ok());
}

#[test]
fn engine_borrows_device() {
    let mut strip = MemoryStrip::new(6);
    {
        let mut engine = PacingEngine::new(&mut strip, config(1)).unwrap();
        assert!(engine.run(find("Shell Sort").unwrap()).is_clean());
    }
    assert!(strip.transmits > 0);
    assert!(strip.pixels().iter().all(|&c| c != Color::BLACK));
}

#[test]
fn lifecycle_contracts_hold() {
    let mut engine = PacingEngine::new(MemoryStrip::new(12), config(5)).unwrap();
    engine.set_delay_time(-2);
    engine.run(find("Merge Sort").unwrap());
    contract_test(
        "engine lifecycle",
        &[
            STRIP_LENGTH_VALID,
            SINGLE_ACTIVE_RUN,
            IDENTITY_SETUP,
            SHUFFLE_IS_PERMUTATION,
            DELAY_CHANGE_FLUSHED,
            SETTLE_COUNTER_FROZEN,
            SETTLE_MARKS_MISMATCH,
            SETTLE_RING_DRAINED,
            TEARDOWN_RESTORES_PACING,
        ],
    );
}
