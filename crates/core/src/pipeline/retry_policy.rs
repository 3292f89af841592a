use std::time::Duration;

use crate::shared::constants::RETRY_DELAY;

/// Decides how long the loop waits after a "no result yet" outcome
/// before the next capture attempt.
///
/// This is a port so hosts can swap the timing strategy. The default is
/// a plain constant delay: service faults abort the loop instead of
/// retrying, so only the empty-result path ever waits.
pub trait RetryPolicy: Send {
    /// Delay before capture attempt `attempt` (1-based).
    fn delay_for(&self, attempt: usize) -> Duration;
}

/// Waits the same fixed interval between every attempt.
pub struct ConstantDelay {
    delay: Duration,
}

impl ConstantDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ConstantDelay {
    fn default() -> Self {
        Self::new(RETRY_DELAY)
    }
}

impl RetryPolicy for ConstantDelay {
    fn delay_for(&self, _attempt: usize) -> Duration {
        self.delay
    }
}
