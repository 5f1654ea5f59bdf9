// ABOUTME: Circuit breaker gating calls to the generative estimator
// ABOUTME: Opens after consecutive failures or a permanent error and closes itself after a quiet window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use nutrilens_core::constants::resilience::{
    DEFAULT_CIRCUIT_FAILURE_THRESHOLD, DEFAULT_CIRCUIT_OPEN_MS,
};
use tracing::{info, warn};

/// Sentinel for "not open" in the opened-at slot
const NOT_OPEN: u64 = u64::MAX;

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; failures are counted
    Closed,
    /// Calls are short-circuited to the fallback
    Open,
}

/// Thresholds controlling when the breaker opens and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before closing itself
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_CIRCUIT_FAILURE_THRESHOLD,
            open_duration: Duration::from_millis(DEFAULT_CIRCUIT_OPEN_MS),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration
    #[must_use]
    pub const fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold,
            open_duration,
        }
    }
}

/// Process-wide breaker for the estimator
///
/// State is `{failure_count, opened_at}` held in atomics so the breaker can be
/// shared through `Arc` without a lock. An open breaker closes itself (and
/// forgets its failure count) the first time it is queried after
/// `open_duration` has elapsed; there is no half-open probe.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Name used in log lines
    name: String,
    /// Consecutive failures since the last success or reset
    failure_count: AtomicU32,
    /// Millis since `start_instant` at which the circuit opened, or `NOT_OPEN`
    opened_at: AtomicU64,
    config: CircuitBreakerConfig,
    start_instant: Instant,
}

impl CircuitBreaker {
    /// Breaker with default thresholds
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Breaker with custom thresholds
    #[must_use]
    pub fn with_config(name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.to_owned(),
            failure_count: AtomicU32::new(0),
            opened_at: AtomicU64::new(NOT_OPEN),
            config,
            start_instant: Instant::now(),
        }
    }

    /// Thresholds in effect
    #[must_use]
    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Consecutive failures recorded
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Current state, applying the auto-close window
    #[must_use]
    pub fn state(&self) -> CircuitState {
        if self.is_open() {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// True while the circuit is open; closes it once the window has passed
    pub fn is_open(&self) -> bool {
        let opened_at = self.opened_at.load(Ordering::SeqCst);
        if opened_at == NOT_OPEN {
            return false;
        }

        // Open windows are seconds to minutes, far within u64 millis
        #[allow(clippy::cast_possible_truncation)]
        let window_ms = self.config.open_duration.as_millis() as u64;
        if self.elapsed_millis().saturating_sub(opened_at) > window_ms {
            if self
                .opened_at
                .compare_exchange(opened_at, NOT_OPEN, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                self.failure_count.store(0, Ordering::SeqCst);
                info!(breaker = %self.name, "Circuit breaker closed after open window");
            }
            return false;
        }
        true
    }

    /// Clear failures and close the circuit
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        self.opened_at.store(NOT_OPEN, Ordering::SeqCst);
    }

    /// Count a failure, opening the circuit at the threshold
    pub fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.config.failure_threshold {
            self.opened_at.store(self.elapsed_millis(), Ordering::SeqCst);
            warn!(
                breaker = %self.name,
                failures = count,
                threshold = self.config.failure_threshold,
                open_ms = self.config.open_duration.as_millis(),
                "Circuit breaker opened"
            );
        }
    }

    /// Open the circuit immediately regardless of the failure count
    pub fn trip(&self) {
        self.opened_at.store(self.elapsed_millis(), Ordering::SeqCst);
        warn!(breaker = %self.name, "Circuit breaker tripped by permanent error");
    }

    /// Force the breaker closed with no recorded failures
    pub fn reset(&self) {
        self.record_success();
        info!(breaker = %self.name, "Circuit breaker reset");
    }

    fn elapsed_millis(&self) -> u64 {
        // Breakers live for the process lifetime, well within u64 millis
        #[allow(clippy::cast_possible_truncation)]
        {
            self.start_instant.elapsed().as_millis() as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_opens_at_threshold() {
        let breaker =
            CircuitBreaker::with_config("test", CircuitBreakerConfig::new(2, Duration::from_secs(30)));
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn test_success_clears_failures() {
        let breaker = CircuitBreaker::new("test");
        breaker.record_failure();
        breaker.record_success();
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_closes_after_window() {
        let breaker =
            CircuitBreaker::with_config("test", CircuitBreakerConfig::new(5, Duration::ZERO));
        breaker.trip();
        thread::sleep(Duration::from_millis(5));
        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 0);
    }
}
