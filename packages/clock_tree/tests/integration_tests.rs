//! Integration tests for `clock_tree` against the real clock.
//!
//! Sleeps guarantee a lower bound on measured durations; upper bounds are
//! deliberately loose because busy machines stretch wall time. Everything
//! order- and count-related is asserted exactly.

use std::thread;
use std::time::Duration;

use clock_tree::{ClockTree, Error};

fn simulate_work(millis: u64) {
    thread::sleep(Duration::from_millis(millis));
}

/// Asserts that exactly one clock with this name exists and that its total
/// is at least the slept time, allowing generous overshoot.
fn verify_time(tree: &ClockTree, clock_name: &str, expected_millis: u64) {
    let matches: Vec<_> = tree
        .root()
        .descendants()
        .into_iter()
        .filter(|clock| clock.name() == clock_name)
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "expected exactly one clock named '{clock_name}'"
    );

    let total = matches.first().unwrap().total_time();
    let expected = Duration::from_millis(expected_millis);
    assert!(
        total >= expected,
        "clock '{clock_name}' accumulated {total:?}, expected at least {expected:?}"
    );
    assert!(
        total < expected.saturating_mul(3) + Duration::from_millis(100),
        "clock '{clock_name}' accumulated {total:?}, implausibly more than {expected:?}"
    );
}

#[test]
fn nested_clocks_measure_their_own_spans() {
    clock_tree::start("step0");

    clock_tree::start("step1");
    simulate_work(30);
    clock_tree::stop("step1");

    clock_tree::start("step2");
    simulate_work(10);
    clock_tree::start("step3");
    simulate_work(10);
    clock_tree::stop("step3");
    clock_tree::stop("step2");

    clock_tree::stop("step0");

    let tree = clock_tree::results().unwrap();
    assert_eq!(tree.root().descendants().len(), 4);
    verify_time(&tree, "step0", 50);
    verify_time(&tree, "step1", 30);
    verify_time(&tree, "step2", 20);
    verify_time(&tree, "step3", 10);

    // Every parent accounts for at least its children.
    for clock in tree.root().descendants() {
        assert!(clock.total_time() >= clock.children_total());
    }
}

#[test]
fn repeated_runs_of_one_clock_accumulate() {
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::start("step2");
    clock_tree::stop("step2");
    clock_tree::start("step1");
    clock_tree::stop("step1");

    let text = clock_tree::results_as_string();
    assert!(text.contains("[step1] {calls: 3}"));
    assert!(text.contains("[step2] {calls: 1}"));
}

#[test]
fn same_name_under_different_parents_renders_ranked() {
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::start("step1");
    clock_tree::stop("step1");

    clock_tree::start("step2");
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::stop("step2");

    let text = clock_tree::results_as_string();
    assert!(text.contains("[step1 (1)] {calls: 2}"));
    assert!(text.contains("[step1 (2)] {calls: 1}"));
}

#[test]
fn duplicate_start_fails_strict_extraction() {
    clock_tree::start("step1");
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::stop("step1");

    let error = clock_tree::results().unwrap_err();
    assert!(matches!(
        error,
        Error::ClockAlreadyStarted { name } if name == "step1"
    ));
}

#[test]
fn duplicate_start_is_described_by_lenient_extraction() {
    clock_tree::start("step1");
    clock_tree::start("step1");
    clock_tree::stop("step1");
    clock_tree::stop("step1");

    let text = clock_tree::results_as_string();
    assert!(text.contains("There has been a fatal inconsistency"));
    assert!(text.contains("step1"));
}

#[test]
fn wrong_stop_order_identifies_both_clocks() {
    clock_tree::start("step1");
    clock_tree::start("step2");
    clock_tree::stop("step1");
    clock_tree::stop("step2");

    let error = clock_tree::results().unwrap_err();
    assert!(matches!(
        error,
        Error::StopOutOfOrder { last_started, stopping }
            if last_started == "step2" && stopping == "step1"
    ));
}

#[test]
fn stop_all_after_inclusive_unwinds_through_the_named_clock() {
    clock_tree::start("step1");
    clock_tree::start("step2");
    clock_tree::start("step3");
    clock_tree::start("step4");
    clock_tree::stop_all_after("step2", true);
    simulate_work(50);
    clock_tree::stop("step1");

    let tree = clock_tree::results().unwrap();
    verify_time(&tree, "step1", 50);
    // Everything from "step2" inward was stopped before the sleep.
    for name in ["step2", "step3", "step4"] {
        let clock = tree
            .root()
            .descendants()
            .into_iter()
            .find(|clock| clock.name() == name)
            .unwrap();
        assert!(clock.total_time() < Duration::from_millis(50));
        assert_eq!(clock.check_count(), 1);
    }
}

#[test]
fn stop_all_after_exclusive_leaves_the_named_clock_running() {
    clock_tree::start("step1");
    clock_tree::start("step2");
    clock_tree::start("step3");
    clock_tree::start("step4");
    clock_tree::stop_all_after("step2", false);
    simulate_work(50);
    clock_tree::stop("step2");
    clock_tree::stop("step1");

    let tree = clock_tree::results().unwrap();
    verify_time(&tree, "step1", 50);
    verify_time(&tree, "step2", 50);
    for name in ["step3", "step4"] {
        let clock = tree
            .root()
            .descendants()
            .into_iter()
            .find(|clock| clock.name() == name)
            .unwrap();
        assert!(clock.total_time() < Duration::from_millis(50));
    }
}

#[test]
fn threads_with_identical_clock_names_stay_independent() {
    clock_tree::start("step0");

    clock_tree::start("step1");
    simulate_work(20);
    clock_tree::stop("step1");

    let other = thread::spawn(|| {
        clock_tree::start("step1");
        clock_tree::start("step2");
        simulate_work(10);
        clock_tree::stop("step2");
        clock_tree::stop("step1");

        let tree = clock_tree::results().unwrap();
        assert_eq!(tree.root().descendants().len(), 2);
        verify_time(&tree, "step1", 10);
        verify_time(&tree, "step2", 10);
    });

    clock_tree::stop("step0");

    let tree = clock_tree::results().unwrap();
    assert_eq!(tree.root().descendants().len(), 2);
    verify_time(&tree, "step0", 20);
    verify_time(&tree, "step1", 20);

    other.join().unwrap();
}

#[test]
fn rendered_results_include_statistics() {
    clock_tree::start("outer");
    clock_tree::start("inner");
    simulate_work(30);
    clock_tree::stop("inner");
    clock_tree::stop("outer");

    let text = clock_tree::results_as_string();
    assert!(text.contains("Leaf nodes ordered by total time:"));
    assert!(text.contains("inner:"));
}

#[test]
fn custom_separators_shape_the_rendering() {
    clock_tree::start("outer");
    clock_tree::start("inner");
    clock_tree::stop("inner");
    clock_tree::stop("outer");

    let text = clock_tree::results_as_string_with(" | ", "> ");
    assert!(text.contains(" | > "));
    assert!(text.contains("[inner]"));
}
