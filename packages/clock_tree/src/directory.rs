//! The thread directory and the public clock-tracking entry points.
//!
//! Each thread gets its own [`Registry`], created lazily on the first call
//! and discarded when that thread extracts its results. The directory is
//! keyed explicitly by thread identity instead of using thread-local storage,
//! so the same layout would also work keyed by a logical task identity under
//! a cooperative scheduler.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::thread;
use std::thread::ThreadId;

use crate::pal::PlatformFacade;
use crate::registry::Registry;
use crate::report::{DEFAULT_CLOCK_SEPARATOR, DEFAULT_LEVEL_SEPARATOR};
use crate::{ClockTree, ERR_POISONED_LOCK, Error};

/// One registry per thread that has called any tracking operation.
///
/// The outer lock is only held long enough to clone or remove an entry; the
/// per-registry lock is effectively uncontended because a registry is only
/// touched by its own thread.
static REGISTRIES: LazyLock<Mutex<HashMap<ThreadId, Arc<Mutex<Registry>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn current_registry() -> Arc<Mutex<Registry>> {
    let mut registries = REGISTRIES.lock().expect(ERR_POISONED_LOCK);
    Arc::clone(
        registries
            .entry(thread::current().id())
            .or_insert_with(|| Arc::new(Mutex::new(new_registry()))),
    )
}

/// Removes and returns the calling thread's registry, so the thread starts
/// from a clean slate afterwards. A fresh registry is produced when the
/// thread never tracked anything, yielding an empty result.
fn take_current_registry() -> Registry {
    let removed = REGISTRIES
        .lock()
        .expect(ERR_POISONED_LOCK)
        .remove(&thread::current().id());

    match removed {
        Some(registry) => {
            let mutex = Arc::try_unwrap(registry)
                .expect("only the owning thread holds handles to its registry");
            mutex.into_inner().expect(ERR_POISONED_LOCK)
        }
        None => new_registry(),
    }
}

fn new_registry() -> Registry {
    Registry::new(thread_label(), PlatformFacade::real())
}

fn thread_label() -> String {
    let current = thread::current();
    current.name().map_or_else(
        || format!("Thread {:?}", current.id()),
        |name| format!("Thread '{name}'"),
    )
}

/// Starts a clock with the given name on the current thread.
///
/// The clock is nested inside the most recently started clock that is still
/// running. Starting a name that is already running anywhere on this thread
/// is an inconsistency; it is recorded and reported when results are
/// extracted, never from this call.
pub fn start(clock_name: &str) {
    current_registry()
        .lock()
        .expect(ERR_POISONED_LOCK)
        .start(clock_name);
}

/// Stops the running clock with the given name on the current thread.
///
/// Clocks must stop in exact reverse order of starting. Stopping a clock
/// that is not running, or not the most recently started one, is an
/// inconsistency; it is recorded and reported when results are extracted,
/// never from this call.
pub fn stop(clock_name: &str) {
    current_registry()
        .lock()
        .expect(ERR_POISONED_LOCK)
        .stop(clock_name);
}

/// Stops every clock still running on the current thread, innermost first.
///
/// Best used on paths that cannot tell which clocks are still running, such
/// as error handling.
pub fn stop_all() {
    current_registry()
        .lock()
        .expect(ERR_POISONED_LOCK)
        .stop_all();
}

/// Stops every clock started after the named one on the current thread,
/// innermost first, and the named clock itself when `inclusive` is set.
///
/// Best used to unwind a known nesting level from an error-handling path.
pub fn stop_all_after(clock_name: &str, inclusive: bool) {
    current_registry()
        .lock()
        .expect(ERR_POISONED_LOCK)
        .stop_all_after(clock_name, inclusive);
}

/// Extracts the current thread's finished clock tree.
///
/// Returns the first inconsistency encountered during the session or while
/// validating the finished tree. Either way, the thread's tracking state is
/// discarded; call this (or [`results_as_string()`]) at the end of every
/// unit of work, ideally in a guaranteed-cleanup path, so a pooled thread
/// never leaks state into its next unit of work.
///
/// For an entry point that cannot fail, use [`results_as_string()`].
pub fn results() -> Result<ClockTree, Error> {
    take_current_registry().into_results()
}

/// Extracts the current thread's results as text, with one clock per line
/// and one tab per nesting level, followed by derived statistics.
///
/// This never fails: inconsistencies are rendered into the text (either as
/// a diagnostic block or as `*`/`!` markers), so the call is safe to leave
/// in production code paths. The thread's tracking state is discarded, as
/// with [`results()`].
#[must_use]
pub fn results_as_string() -> String {
    results_as_string_with(DEFAULT_CLOCK_SEPARATOR, DEFAULT_LEVEL_SEPARATOR)
}

/// Extracts the current thread's results as text using the given separators.
///
/// `clock_separator` goes between rendered clocks; `level_separator` is
/// inserted once per nesting level in front of each nested clock.
#[must_use]
pub fn results_as_string_with(clock_separator: &str, level_separator: &str) -> String {
    take_current_registry().into_text(clock_separator, level_separator)
}
