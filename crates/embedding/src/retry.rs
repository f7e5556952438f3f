//! Retry configuration with exponential backoff and jitter.
//!
//! Transient provider failures are retried with exponentially growing delays,
//! capped at `max_delay`. Jitter spreads the retries of concurrent callers so
//! they do not hit a recovering endpoint in lockstep.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration for embedding API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = single try, no retries).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries, stored as milliseconds.
    #[serde(default = "default_base_delay", with = "crate::serde_millis")]
    pub base_delay: Duration,

    /// Upper bound on any single delay, stored as milliseconds.
    #[serde(default = "default_max_delay", with = "crate::serde_millis")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Whether to add random jitter to delays.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before the given retry attempt (1-based).
    ///
    /// Attempt 0 is the first try and has no delay. Attempt `n` waits
    /// `base_delay * backoff_multiplier^(n-1)`, capped at `max_delay`, with
    /// an optional +/- 25% jitter spread.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let raw_ms = self.base_delay.as_millis() as f64 * exp;
        let capped_ms = raw_ms.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.jitter {
            let spread = capped_ms * 0.25;
            let offset = fastrand::f64() * 2.0 * spread - spread;
            (capped_ms + offset).max(0.0)
        } else {
            capped_ms
        };
        Duration::from_millis(delay_ms as u64)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}
