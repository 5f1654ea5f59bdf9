// ABOUTME: Estimator configuration: enable switch, model identity, retry and breaker budgets
// ABOUTME: Loaded from ENABLE_AI, AI_MODEL, AI_TIMEOUT_MS, NUTRITION_MAX_RETRIES, and friends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::time::Duration;

use nutrilens_core::constants::estimator::{
    DEFAULT_MODEL, DEFAULT_MODEL_VERSION, DEFAULT_PROMPT_VERSION,
};
use nutrilens_core::constants::resilience::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_CIRCUIT_FAILURE_THRESHOLD, DEFAULT_CIRCUIT_OPEN_MS,
    DEFAULT_MAX_LATENCY_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS,
};
use nutrilens_providers::{CircuitBreakerConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{env_parse, env_string};

const ENABLED_MARKERS: &[&str] = &["1", "true", "yes", "on", "enabled"];
const DISABLED_MARKERS: &[&str] = &["0", "false", "no", "off", "disabled", ""];

/// Interpret an `ENABLE_AI` value
///
/// Unset and unrecognized values leave the estimator enabled.
#[must_use]
pub fn parse_enabled(raw: Option<&str>) -> bool {
    let Some(raw) = raw else {
        return true;
    };
    let normalized = raw.trim().to_lowercase();
    if ENABLED_MARKERS.contains(&normalized.as_str()) {
        return true;
    }
    !DISABLED_MARKERS.contains(&normalized.as_str())
}

/// Model identity; every field participates in cache keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Generative model name
    pub model: String,
    /// Model release tag
    pub model_version: String,
    /// Prompt template version
    pub prompt_version: String,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            model_version: DEFAULT_MODEL_VERSION.to_owned(),
            prompt_version: DEFAULT_PROMPT_VERSION.to_owned(),
        }
    }
}

impl ModelInfo {
    /// Load model identity from `AI_MODEL`, `MODEL_VERSION`, `PROMPT_VERSION`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            model: env_string("AI_MODEL", DEFAULT_MODEL),
            model_version: env_string("MODEL_VERSION", DEFAULT_MODEL_VERSION),
            prompt_version: env_string("PROMPT_VERSION", DEFAULT_PROMPT_VERSION),
        }
    }
}

/// Everything the resilient provider needs besides the client itself
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Whether the estimator is consulted at all
    pub enabled: bool,
    /// Model identity
    pub model: ModelInfo,
    /// Timeout, latency ceiling, retries, and backoff
    pub retry: RetryPolicy,
    /// Breaker thresholds
    pub circuit: CircuitBreakerConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: ModelInfo::default(),
            retry: RetryPolicy::default(),
            circuit: CircuitBreakerConfig::default(),
        }
    }
}

impl EstimatorConfig {
    /// Load estimator configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self {
            enabled: parse_enabled(env::var("ENABLE_AI").ok().as_deref()),
            model: ModelInfo::from_env(),
            retry: RetryPolicy {
                max_retries: env_parse("NUTRITION_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                backoff_base_ms: env_parse("AI_BACKOFF_BASE_MS", DEFAULT_BACKOFF_BASE_MS),
                timeout_ms: env_parse("AI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
                max_latency_ms: env_parse("AI_MAX_LATENCY_MS", DEFAULT_MAX_LATENCY_MS),
                retry_on_429: env::var("RETRY_ON_429").is_ok_and(|v| v.trim() == "1"),
            },
            circuit: CircuitBreakerConfig::new(
                env_parse("AI_CIRCUIT_FAILURE_THRESHOLD", DEFAULT_CIRCUIT_FAILURE_THRESHOLD)
                    .max(1),
                Duration::from_millis(env_parse("AI_CIRCUIT_OPEN_MS", DEFAULT_CIRCUIT_OPEN_MS)),
            ),
        };
        if !config.retry.latency_budget_enforced() {
            debug!(
                timeout_ms = config.retry.timeout_ms,
                max_latency_ms = config.retry.max_latency_ms,
                "Latency ceiling at or above attempt timeout; timeout is the binding limit"
            );
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_markers() {
        assert!(parse_enabled(None));
        assert!(parse_enabled(Some("YES")));
        assert!(parse_enabled(Some("maybe")));
        assert!(!parse_enabled(Some("off")));
        assert!(!parse_enabled(Some("")));
        assert!(!parse_enabled(Some(" 0 ")));
    }
}
