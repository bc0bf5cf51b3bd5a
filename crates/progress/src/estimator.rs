//! Completion estimation.

use buildwatch_core::{Percentage, Time};
use chrono::Duration;

/// Completion estimator for running builds.
///
/// The baseline is the duration of the target's last successful build.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressEstimator;

impl ProgressEstimator {
    /// Percentage of `expected` covered by `elapsed`.
    ///
    /// An unknown or non-positive baseline yields zero. Overruns are capped
    /// at 100 and negative elapsed time (clock skew) at 0.
    pub fn percent_complete(&self, elapsed: Duration, expected: Option<Duration>) -> Percentage {
        let Some(expected) = expected else {
            return Percentage::ZERO;
        };
        let expected_ms = expected.num_milliseconds();
        if expected_ms <= 0 {
            return Percentage::ZERO;
        }

        let elapsed_ms = elapsed.num_milliseconds();
        Percentage::of(elapsed_ms.saturating_mul(100) / expected_ms)
    }

    /// Completion of a build that started at `started`, as seen at `now`.
    pub fn estimate(&self, started: Time, now: Time, expected: Option<Duration>) -> Percentage {
        self.percent_complete(now - started, expected)
    }
}
