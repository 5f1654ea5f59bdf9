// ABOUTME: Estimator call resilience defaults: timeout, latency ceiling, retries, breaker
// ABOUTME: Overridable via AI_TIMEOUT_MS, AI_MAX_LATENCY_MS, NUTRITION_MAX_RETRIES, etc.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Hard abort timeout per estimator attempt
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;

/// Successful calls slower than this still count as breaker failures
pub const DEFAULT_MAX_LATENCY_MS: u64 = 15_000;

/// Retries after the first attempt for transient failures
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Base of the exponential backoff (`base * 2^attempt`)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 200;

/// Consecutive failures that open the circuit
pub const DEFAULT_CIRCUIT_FAILURE_THRESHOLD: u32 = 5;

/// How long an open circuit stays open
pub const DEFAULT_CIRCUIT_OPEN_MS: u64 = 30_000;

/// Fallback reasons surfaced as warnings next to `ai_fallback_dict`
pub mod reasons {
    /// Estimator disabled by configuration
    pub const AI_DISABLED: &str = "ai_disabled";
    /// Circuit breaker was open
    pub const AI_CIRCUIT_OPEN: &str = "ai_circuit_open";
    /// Transient failures exhausted the retry budget
    pub const DICT_ERROR: &str = "dict_error";
    /// Permanent failure tripped the breaker
    pub const DICT_PERMANENT_ERROR: &str = "dict_permanent_error";
    /// Every attempt was too slow
    pub const DICT_UNAVAILABLE: &str = "dict_unavailable";
}

/// Warning tag attached to every dictionary fallback
pub const WARN_AI_FALLBACK_DICT: &str = "ai_fallback_dict";
