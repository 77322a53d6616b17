//! Simplified example demonstrating the `clock_tree` API end to end.
//!
//! A small "pipeline" is instrumented with nested clocks, including a
//! repeated step and two distinct clocks sharing a name, and the rendered
//! tree with its statistics is printed at the end.
//!
//! Run with: `cargo run --example clock_tree_basic`.

use std::thread;
use std::time::Duration;

fn simulate_work(millis: u64) {
    thread::sleep(Duration::from_millis(millis));
}

fn main() {
    clock_tree::start("pipeline");

    clock_tree::start("load");
    simulate_work(40);
    clock_tree::stop("load");

    // A repeated clock: three runs accumulate on one tree node.
    for _ in 0..3 {
        clock_tree::start("transform");
        simulate_work(15);
        clock_tree::stop("transform");
    }

    clock_tree::start("store");
    clock_tree::start("validate");
    simulate_work(10);
    clock_tree::stop("validate");
    simulate_work(20);
    clock_tree::stop("store");

    clock_tree::stop("pipeline");

    // A top-level "validate" distinct from the one nested under "store";
    // the rendering disambiguates them as "validate (1)" and "validate (2)".
    clock_tree::start("validate");
    simulate_work(5);
    clock_tree::stop("validate");

    println!("{}", clock_tree::results_as_string());
}
