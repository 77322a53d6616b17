//! The clock primitive: a named timer accumulating time across checks.

use std::fmt;
use std::time::Duration;

use crate::pal::{Platform, PlatformFacade};

/// A named timer that accumulates the time passed between checkpoints.
///
/// A stopwatch marks the beginning of an interval with [`restart()`][Self::restart]
/// and accumulates the interval into its running total with [`check()`][Self::check].
/// The accumulated total only ever grows (except across an explicit
/// [`reset()`][Self::reset]), and the number of completed checks is counted.
///
/// This is the primitive the per-thread clock tree is built from, but it is
/// also usable on its own for one-off measurements:
///
/// ```
/// use clock_tree::Stopwatch;
///
/// let mut stopwatch = Stopwatch::new("query");
/// // ... perform the work to be measured ...
/// let elapsed = stopwatch.check();
/// println!("query took {elapsed:?}, {} checks so far", stopwatch.check_count());
/// ```
#[derive(Debug)]
pub struct Stopwatch {
    name: String,
    platform: PlatformFacade,
    last_timestamp: Duration,
    total: Duration,
    check_count: u64,
}

impl Stopwatch {
    /// Creates a stopwatch with the given name, with its first interval
    /// starting immediately.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_platform(name, PlatformFacade::real())
    }

    pub(crate) fn with_platform(name: impl Into<String>, platform: PlatformFacade) -> Self {
        let last_timestamp = platform.timestamp();

        Self {
            name: name.into(),
            platform,
            last_timestamp,
            total: Duration::ZERO,
            check_count: 0,
        }
    }

    /// The name this stopwatch was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The time accumulated by all checks so far.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.total
    }

    /// How many times [`check()`][Self::check] has been called.
    #[must_use]
    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    /// Accumulates the time passed since the previous check (or since the
    /// last restart, whichever came later) and returns it.
    pub fn check(&mut self) -> Duration {
        self.check_count = self
            .check_count
            .checked_add(1)
            .expect("check count overflows u64 - this indicates an unrealistic scenario");

        let now = self.platform.timestamp();
        let elapsed = now.saturating_sub(self.last_timestamp);
        self.last_timestamp = now;

        self.total = self
            .total
            .checked_add(elapsed)
            .expect("accumulated time overflows Duration - this indicates an unrealistic scenario");

        elapsed
    }

    /// Marks the start of a new interval without accumulating anything.
    ///
    /// The time between the previous checkpoint and this call is discarded.
    /// The accumulated total is untouched; for that, use [`reset()`][Self::reset].
    pub fn restart(&mut self) {
        self.last_timestamp = self.platform.timestamp();
    }

    /// Discards the accumulated total and marks the start of a new interval.
    ///
    /// The check count is untouched: it counts every check over the
    /// stopwatch's lifetime, including those made before the reset.
    pub fn reset(&mut self) {
        self.restart();
        self.total = Duration::ZERO;
    }
}

impl fmt::Display for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}ms (calls: {})",
            self.name,
            self.total.as_millis(),
            self.check_count
        )
    }
}
