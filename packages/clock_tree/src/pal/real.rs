//! Real platform implementation backed by the standard library clock.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// Origin shared by all timestamps produced by the real platform.
///
/// Using one process-wide origin keeps timestamps from different registries
/// mutually comparable, which the diagnostics occasionally rely on.
static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// The one true real platform, used by all real platform facades.
pub(crate) static REAL_PLATFORM: RealPlatform = RealPlatform;

/// Real implementation of the platform abstraction, reading the
/// monotonic clock of the operating system.
#[derive(Debug)]
pub(crate) struct RealPlatform;

impl Platform for RealPlatform {
    #[cfg_attr(test, mutants::skip)] // Cannot make meaningful assertions about real time.
    fn timestamp(&self) -> Duration {
        ORIGIN.elapsed()
    }
}
