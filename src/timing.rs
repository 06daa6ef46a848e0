use crate::error::BenchError;
use std::time::Instant;

/// A point on the monotonic clock. Durations between two timestamps are
/// reported in whole microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(Instant);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(Instant::now())
    }

    /// Microseconds elapsed from `start` to `self`. `label` names the later
    /// checkpoint and shows up in the error if the clock ran backwards.
    pub fn micros_since(self, start: Timestamp, label: &'static str) -> Result<u64, BenchError> {
        let elapsed = self
            .0
            .checked_duration_since(start.0)
            .ok_or(BenchError::Clock(label))?;
        Ok(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
    }
}
