//! Every registered algorithm sorts any shuffled identity.

use blinksort::harness::SortHarness;
use blinksort::sink::Event;
use blinksort::ALGORITHMS;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_algorithm_sorts_shuffled_identity(n in 1usize..160, seed in any::<u64>()) {
        let mut harness = SortHarness::new(seed);
        let input = harness.shuffled(n);
        for algo in ALGORITHMS {
            let out = harness.sort_unpaced(algo, &input);
            prop_assert!(
                blinksort::harness::is_identity(&out),
                "{} left {:?}", algo.name, out
            );
        }
    }

    #[test]
    fn algorithms_are_reentrant(n in 2usize..64, seed in any::<u64>()) {
        let mut harness = SortHarness::new(seed);
        for algo in ALGORITHMS {
            prop_assert!(harness.run_shuffled(algo, n).is_identity(), "{}", algo.name);
            prop_assert!(harness.run_shuffled(algo, n).is_identity(), "{}", algo.name);
        }
    }
}

#[test]
fn algorithms_never_bypass_pacing() {
    let mut harness = SortHarness::new(7);
    for algo in ALGORITHMS {
        let run = harness.run_shuffled(algo, 40);
        assert!(run.is_identity(), "{}", algo.name);
        assert_eq!(run.log.undelayed_accesses(), 0, "{}", algo.name);
        assert!(
            run.log
                .events
                .iter()
                .any(|e| matches!(e, Event::Comparison { .. } | Event::CounterIncrement)),
            "{} never compared",
            algo.name
        );
    }
}

#[test]
fn cancelled_harness_leaves_input_untouched_by_simple_sorts() {
    let mut harness = SortHarness::new(3);
    harness.cancel_token().cancel();
    let input = harness.shuffled(30);
    let out = harness.sort_unpaced(blinksort::algorithms::find("Selection Sort").unwrap(), &input);
    assert_eq!(out, input);
}
