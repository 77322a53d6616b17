use thiserror::Error;

/// Inconsistencies that can be detected while tracking clocks.
///
/// The first three variants are usage errors: they are detected eagerly at
/// the offending [`start()`](crate::start)/[`stop()`](crate::stop) call but
/// are only surfaced when results are extracted, so instrumentation never
/// interrupts the host control flow. The remaining variants are structural
/// errors found when validating the finished tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A clock was started while another clock with the same name was still
    /// running anywhere on the current thread.
    #[error("there is already a clock named '{name}' running on the current thread")]
    ClockAlreadyStarted {
        /// Name of the clock whose start was rejected.
        name: String,
    },

    /// A clock was stopped that is not currently running on this thread.
    #[error("there is no clock named '{name}' running on this thread to stop")]
    NoClockToStop {
        /// Name the stop call referred to.
        name: String,
    },

    /// Clocks must stop in exact reverse order of starting and this stop
    /// named a clock that is not the most recently started one.
    #[error("the last clock started was '{last_started}'; it must stop before '{stopping}'")]
    StopOutOfOrder {
        /// The clock at the top of the running stack, which has to close first.
        last_started: String,

        /// The clock the stop call referred to.
        stopping: String,
    },

    /// Results were requested while clocks were still running.
    #[error(
        "there are still clocks that started but were not stopped, so it should not \
         be time for results yet; clocks still running: {names}"
    )]
    ClocksStillRunning {
        /// Names of the running clocks, most recently started first.
        names: String,
    },

    /// A clock accumulated less time than the sum of its children, which
    /// cannot happen when nesting is used correctly.
    #[error(
        "something seems wrong with clock '{name}': its total time ({total_millis}ms) \
         is inferior to its children's total ({children_millis}ms)"
    )]
    ChildrenExceedTotal {
        /// Name of the suspicious clock.
        name: String,

        /// The clock's own accumulated milliseconds.
        total_millis: u128,

        /// The sum of the children's accumulated milliseconds.
        children_millis: u128,
    },

    /// A clock was reachable through two paths of the execution tree.
    #[error("something seems wrong with clock '{name}': it is referenced twice in the execution tree")]
    ClockRepeatedInTree {
        /// Name of the clock that was encountered twice.
        name: String,
    },
}

/// A specialized `Result` type for clock tracking operations, returning the
/// crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn messages_name_the_offending_clocks() {
        let error = Error::ClockAlreadyStarted {
            name: "parse".to_string(),
        };
        assert!(error.to_string().contains("'parse'"));

        let error = Error::StopOutOfOrder {
            last_started: "child".to_string(),
            stopping: "parent".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("'child'"));
        assert!(message.contains("'parent'"));
    }
}
