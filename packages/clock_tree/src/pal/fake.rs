//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ERR_POISONED_LOCK;
use crate::pal::abstractions::Platform;

/// Fake implementation of the platform abstraction for testing.
///
/// This implementation lets tests control the current time instead of relying
/// on the actual system clock. Multiple clones of the same `FakePlatform`
/// share the same underlying time state, allowing tests to advance time after
/// the platform has been handed to the code under test.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    timestamp: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a new fake platform whose clock reads zero.
    pub(crate) fn new() -> Self {
        Self {
            timestamp: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Sets the current timestamp.
    ///
    /// This affects all clones of this platform. Moving time backwards is
    /// allowed here so tests can probe how consumers react to it.
    pub(crate) fn set_timestamp(&self, timestamp: Duration) {
        *self.timestamp.lock().expect(ERR_POISONED_LOCK) = timestamp;
    }

    /// Advances the current timestamp by the given amount.
    pub(crate) fn advance(&self, amount: Duration) {
        let mut timestamp = self.timestamp.lock().expect(ERR_POISONED_LOCK);
        *timestamp = timestamp
            .checked_add(amount)
            .expect("advancing fake time overflows Duration - this indicates a broken test");
    }
}

impl Platform for FakePlatform {
    fn timestamp(&self) -> Duration {
        *self.timestamp.lock().expect(ERR_POISONED_LOCK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_time() {
        let platform = FakePlatform::new();

        assert_eq!(platform.timestamp(), Duration::ZERO);
    }

    #[test]
    fn sets_timestamp() {
        let platform = FakePlatform::new();
        platform.set_timestamp(Duration::from_millis(150));

        assert_eq!(platform.timestamp(), Duration::from_millis(150));
    }

    #[test]
    fn advances_timestamp() {
        let platform = FakePlatform::new();
        platform.set_timestamp(Duration::from_millis(100));
        platform.advance(Duration::from_millis(25));

        assert_eq!(platform.timestamp(), Duration::from_millis(125));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_timestamp(Duration::from_millis(100));

        assert_eq!(platform2.timestamp(), Duration::from_millis(100));
    }
}
