//! Hierarchical wall-time profiling for instrumented code paths.
//!
//! This package tracks named, arbitrarily nestable timed sections ("clocks")
//! marked by plain [`start()`]/[`stop()`] calls and reconstructs, for each
//! calling thread, a tree of clocks with accumulated durations and call
//! counts. No scope guards or callbacks are required, so existing code can
//! be instrumented without restructuring it.
//!
//! The core functionality includes:
//! - [`start()`] / [`stop()`] - Mark the boundaries of a named timed section
//! - [`stop_all()`] / [`stop_all_after()`] - Bulk-unwind running clocks from cleanup paths
//! - [`results()`] - Extract the finished tree, raising on any inconsistency
//! - [`results_as_string()`] - Extract the rendered tree, never raising
//! - [`ClockTree`] / [`ClockNode`] - Navigate and render an extracted tree
//! - [`Stopwatch`] - The standalone timing primitive the tree is built from
//!
//! This package is a development and diagnostics tool; keeping the calls in
//! production code paths is safe (the lenient extraction never fails), but
//! the measurements themselves are wall-time and carry the usual noise.
//!
//! # Simple Usage
//!
//! ```
//! clock_tree::start("request");
//!
//! clock_tree::start("parse");
//! // ... parsing work ...
//! clock_tree::stop("parse");
//!
//! clock_tree::start("respond");
//! // ... rendering work ...
//! clock_tree::stop("respond");
//!
//! clock_tree::stop("request");
//!
//! // Prints the indented tree plus derived statistics, and resets
//! // this thread's tracking state.
//! println!("{}", clock_tree::results_as_string());
//! ```
//!
//! # Inspecting Results Programmatically
//!
//! [`results()`] returns the tree itself instead of text. It fails on any
//! recorded inconsistency, so misuse of the start/stop protocol is caught in
//! tests rather than silently producing garbage numbers:
//!
//! ```
//! clock_tree::start("work");
//! clock_tree::stop("work");
//!
//! let tree = clock_tree::results().expect("start/stop calls were well nested");
//! let work = tree.root().children().next().unwrap();
//! assert_eq!(work.name(), "work");
//! assert_eq!(work.check_count(), 1);
//! ```
//!
//! # Failure Semantics
//!
//! The tracking calls themselves never fail and never panic: a profiling
//! utility must not be the reason the host application crashes. Misuse
//! (starting an already-running name, stopping a clock that is not running,
//! stopping out of order) is recorded and surfaces only at extraction time.
//! [`results()`] reports the first such condition as an [`Error`];
//! [`results_as_string()`] converts it into a diagnostic text block instead.
//!
//! ```
//! clock_tree::start("a");
//! clock_tree::start("b");
//! clock_tree::stop("a"); // Out of order: "b" must stop first.
//! clock_tree::stop("b");
//!
//! let text = clock_tree::results_as_string();
//! assert!(text.contains("fatal inconsistency"));
//! ```
//!
//! # Threading
//!
//! Each thread is tracked independently: clocks, trees and results never mix
//! across threads, and identical clock names on different threads are
//! unrelated. Every thread must extract its own results. A thread that is
//! reused without extracting (for example in a thread pool) keeps its old
//! tracking state and will corrupt its next measurement, so extraction
//! belongs in a guaranteed-cleanup path at the end of every unit of work.

mod directory;
mod error;
mod pal;
mod registry;
mod report;
mod stopwatch;

pub use directory::{
    results, results_as_string, results_as_string_with, start, stop, stop_all, stop_all_after,
};
pub use error::Error;
pub use report::{ClockNode, ClockTree};
pub use stopwatch::Stopwatch;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
