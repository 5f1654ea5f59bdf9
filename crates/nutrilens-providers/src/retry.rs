// ABOUTME: Retry budget and exponential backoff for estimator attempts
// ABOUTME: Attempts run strictly in sequence; backoff is base * 2^attempt without jitter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use nutrilens_core::constants::resilience::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_LATENCY_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};

/// Per-request retry and latency budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`)
    pub max_retries: u32,
    /// Backoff before retry `n` is `backoff_base_ms * 2^n`
    pub backoff_base_ms: u64,
    /// Hard timeout for a single attempt
    pub timeout_ms: u64,
    /// Successful attempts slower than this count as failures
    ///
    /// Only reachable when below `timeout_ms`; the defaults (15000 over 8000)
    /// leave the timeout as the binding limit.
    pub max_latency_ms: u64,
    /// Treat HTTP 429 as transient
    pub retry_on_429: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_latency_ms: DEFAULT_MAX_LATENCY_MS,
            retry_on_429: false,
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retrying after `attempt` (zero-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Per-attempt timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Latency ceiling for an acceptable success
    #[must_use]
    pub const fn max_latency(&self) -> Duration {
        Duration::from_millis(self.max_latency_ms)
    }

    /// Whether a success can finish inside the timeout yet exceed the latency ceiling
    #[must_use]
    pub const fn latency_budget_enforced(&self) -> bool {
        self.max_latency_ms < self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(1600));
        assert_eq!(policy.attempts(), 2);
    }

    #[test]
    fn test_latency_budget_needs_ceiling_below_timeout() {
        assert!(!RetryPolicy::default().latency_budget_enforced());
        let tight = RetryPolicy {
            timeout_ms: 500,
            max_latency_ms: 20,
            ..RetryPolicy::default()
        };
        assert!(tight.latency_budget_enforced());
        let equal = RetryPolicy {
            max_latency_ms: 500,
            ..tight
        };
        assert!(!equal.latency_budget_enforced());
    }
}
