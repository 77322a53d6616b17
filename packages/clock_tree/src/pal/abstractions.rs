//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides access to a monotonic time source.
///
/// This trait abstracts the underlying clock, allowing for both a real
/// implementation (backed by [`std::time::Instant`]) and a fake implementation
/// whose time only advances when a test says so.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Returns the time elapsed since an arbitrary but fixed origin.
    ///
    /// Timestamps from the same platform instance are monotonically
    /// non-decreasing and may be subtracted from each other.
    fn timestamp(&self) -> Duration;
}
