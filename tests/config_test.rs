// ABOUTME: Integration tests for environment-driven pipeline configuration
// ABOUTME: Provider selection, estimator switch, cache flags, masking, and guardrail bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;

use common::init_test_logging;
use nutrilens::config::{parse_enabled, CacheConfig, MaskStrategy, NutritionConfig, ProviderMode};
use nutrilens_core::constants::cache::TTL_ANALYSIS_SECS;
use nutrilens_core::constants::guardrails::DEFAULT_MIN_KCAL;
use serial_test::serial;

const VARS: &[&str] = &[
    "NUTRITION_PROVIDER",
    "ENABLE_AI",
    "CACHE_ENABLED",
    "CACHE_TTL_SEC",
    "CACHE_MAX_ENTRIES",
    "CALORIE_MASK_STRATEGY",
    "GUARD_KCAL_MIN",
    "LOW_CAL_REGEX_EXTRA",
    "RETRY_ON_429",
    "NUTRITION_MAX_RETRIES",
    "AI_TIMEOUT_MS",
    "AI_MAX_LATENCY_MS",
];

/// Clears every variable this file touches, before and after the test body
struct EnvGuard;

impl EnvGuard {
    fn new() -> Self {
        init_test_logging();
        Self::clear();
        Self
    }

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        Self::clear();
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    let _guard = EnvGuard::new();
    let config = NutritionConfig::from_env();

    assert_eq!(config.provider, ProviderMode::Ai);
    assert!(config.estimator.enabled);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, TTL_ANALYSIS_SECS);
    assert_eq!(config.mask_strategy, MaskStrategy::Never);
    assert!((config.guardrails.options.min_kcal - DEFAULT_MIN_KCAL).abs() < f64::EPSILON);
    assert!(!config.estimator.retry.retry_on_429);
}

#[test]
#[serial]
fn test_provider_selection() {
    let _guard = EnvGuard::new();

    env::set_var("NUTRITION_PROVIDER", "hybrid");
    assert_eq!(NutritionConfig::from_env().provider, ProviderMode::Hybrid);

    env::set_var("NUTRITION_PROVIDER", "DICT");
    assert_eq!(NutritionConfig::from_env().provider, ProviderMode::Dict);

    env::set_var("NUTRITION_PROVIDER", "openai");
    assert_eq!(NutritionConfig::from_env().provider, ProviderMode::Ai);
}

#[test]
#[serial]
fn test_enable_ai_switch() {
    let _guard = EnvGuard::new();

    for off in ["0", "false", "OFF", "no"] {
        env::set_var("ENABLE_AI", off);
        assert!(!NutritionConfig::from_env().estimator.enabled, "{off}");
    }
    env::set_var("ENABLE_AI", "1");
    assert!(NutritionConfig::from_env().estimator.enabled);

    assert!(parse_enabled(None));
    assert!(parse_enabled(Some("maybe")));
    assert!(!parse_enabled(Some("")));
}

#[test]
#[serial]
fn test_cache_flags() {
    let _guard = EnvGuard::new();

    env::set_var("CACHE_ENABLED", "0");
    env::set_var("CACHE_TTL_SEC", "60");
    env::set_var("CACHE_MAX_ENTRIES", "0");
    let cache = CacheConfig::from_env();
    assert!(!cache.enabled);
    assert_eq!(cache.ttl_secs, 60);
    assert_eq!(cache.max_entries, CacheConfig::default().max_entries);

    env::set_var("CACHE_ENABLED", "false");
    assert!(CacheConfig::from_env().enabled);
}

#[test]
#[serial]
fn test_mask_strategy_and_retry_flags() {
    let _guard = EnvGuard::new();

    env::set_var("CALORIE_MASK_STRATEGY", "fallback_all_pending");
    env::set_var("RETRY_ON_429", "1");
    env::set_var("NUTRITION_MAX_RETRIES", "not-a-number");
    let config = NutritionConfig::from_env();

    assert_eq!(config.mask_strategy, MaskStrategy::FallbackAllPending);
    assert!(config.estimator.retry.retry_on_429);
    assert_eq!(
        config.estimator.retry.max_retries,
        NutritionConfig::default().estimator.retry.max_retries
    );
}

#[test]
#[serial]
fn test_guardrail_bounds_and_allowlist() {
    let _guard = EnvGuard::new();

    env::set_var("GUARD_KCAL_MIN", "200");
    env::set_var("LOW_CAL_REGEX_EXTRA", "寒天");
    let config = NutritionConfig::from_env();
    assert!((config.guardrails.options.min_kcal - 200.0).abs() < f64::EPSILON);
    assert!(config.guardrails.runner().is_ok());

    env::set_var("LOW_CAL_REGEX_EXTRA", "(unclosed");
    assert!(NutritionConfig::from_env().guardrails.runner().is_err());
}

#[test]
#[serial]
fn test_latency_ceiling_below_timeout() {
    let _guard = EnvGuard::new();
    assert!(!NutritionConfig::from_env()
        .estimator
        .retry
        .latency_budget_enforced());

    env::set_var("AI_TIMEOUT_MS", "5000");
    env::set_var("AI_MAX_LATENCY_MS", "3000");
    let retry = NutritionConfig::from_env().estimator.retry;
    assert_eq!(retry.timeout_ms, 5000);
    assert!(retry.latency_budget_enforced());
}
