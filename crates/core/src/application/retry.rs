// Retry logic for lost optimistic writes
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reload and try again after the delay
    Retry(Duration),
    /// Attempts exhausted, surface a conflict
    GiveUp,
}

/// Bounded retry policy for compare-and-swap conflicts.
///
/// A conflict means another writer changed the queue between our read and
/// our write. The operation is reapplied on the fresh snapshot, so retrying
/// is always safe; the bound only keeps a hot queue from starving a caller.
#[derive(Debug, Clone)]
pub struct SwapRetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl SwapRetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first one (minimum 1)
    /// * `base_delay_ms` - Delay after the first conflict, doubled each time
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide what to do after `attempt` (1-based) lost its swap.
    ///
    /// Backoff formula:
    /// delay = base_delay * 2^(attempt - 1) * (1.0 ± 0.1)
    pub fn should_retry(&self, queue_id: &str, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            warn!(
                queue_id = %queue_id,
                attempts = attempt,
                "Giving up after repeated write conflicts"
            );
            return RetryDecision::GiveUp;
        }

        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base_delay_ms = self.base_delay_ms.saturating_mul(exp) as f64;

        // ±10% jitter so that racing writers fall out of lockstep
        let jitter_factor = rand::thread_rng().gen_range(0.9..=1.1);
        let delay_ms = (base_delay_ms * jitter_factor) as u64;

        RetryDecision::Retry(Duration::from_millis(delay_ms))
    }
}
