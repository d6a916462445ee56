use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy for index compare-and-swap updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Total attempts (first try included) before giving up. Values below 2
    /// are raised to 2 so a conflict is always retried at least once.
    pub max_attempts: u32,
    /// Backoff before the first retry, in milliseconds.
    pub backoff_base_ms: u64,
    /// Upper bound on any single backoff, in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            backoff_base_ms: 1,
            backoff_max_ms: 50,
        }
    }
}

impl IndexConfig {
    /// A configuration that retries without sleeping.
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        }
    }

    /// The attempt budget actually used by the maintainer.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(2)
    }

    /// Exponential backoff ceiling for the retry following `attempt`
    /// (1-based), before jitter.
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << shift)
            .min(self.backoff_max_ms);
        Duration::from_millis(ms)
    }

    /// Backoff with full jitter: uniform in `[0, ceiling]`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
    }
}
