// ABOUTME: Configuration management module for the nutrition pipeline
// ABOUTME: Collects estimator, guardrail, policy, cache, and provider settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for nutrilens
//!
//! Every setting has a default from `nutrilens_core::constants`; environment
//! variables only override. Unparseable values fall back to the default
//! rather than failing startup, except for the low-calorie pattern, which is
//! compiled when the guardrail runner is built.

use std::env;
use std::fmt;
use std::str::FromStr;

use nutrilens_core::constants::estimator::DEFAULT_CANDIDATE_LIMIT;
use nutrilens_core::constants::guardrails::{
    DEFAULT_GUARDRAIL_VERSION, DEFAULT_MAX_KCAL, DEFAULT_MIN_KCAL, DEFAULT_RECONCILE_TOLERANCE,
};
use nutrilens_core::constants::policy::{
    ATWATER_TOLERANCE, OIL_ABSORPTION_MAX, OIL_ABSORPTION_MID, OIL_ABSORPTION_MIN,
};
use nutrilens_core::errors::GuardrailError;
use nutrilens_intelligence::{
    ConservationPolicy, GuardrailOptions, GuardrailRunner, LowCalorieMatcher, OilAbsorption,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Response cache settings
pub mod cache;
/// Estimator enable switch, model identity, and resilience budgets
pub mod estimator;

pub use cache::CacheConfig;
pub use estimator::{parse_enabled, EstimatorConfig, ModelInfo};

/// Which provider stack answers `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Resilient estimator with dictionary fallback
    #[default]
    Ai,
    /// Catalog candidates first, then the resilient estimator
    Hybrid,
    /// Deterministic dictionary only
    Dict,
}

impl ProviderMode {
    /// Wire name used in cache keys and `meta.provider`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Hybrid => "hybrid",
            Self::Dict => "dict",
        }
    }

    /// Parse a mode name, defaulting to `Ai` for anything unrecognized
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "hybrid" => Ok(Self::Hybrid),
            "dict" => Ok(Self::Dict),
            other => Err(format!("unknown provider '{other}' (expected ai|hybrid|dict)")),
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When calories are hidden from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Calories are always shown
    #[default]
    Never,
    /// Zero calories for fallback results whose items are all pending
    FallbackAllPending,
}

impl MaskStrategy {
    /// Parse `CALORIE_MASK_STRATEGY`, defaulting to `Never`
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "fallback_all_pending" => Self::FallbackAllPending,
            _ => Self::Never,
        }
    }
}

/// Guardrail version, bounds, and allowlist extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Release tag stamped into guarded payloads and cache keys
    pub version: String,
    /// kcal floor, ceiling, and reconcile tolerance
    pub options: GuardrailOptions,
    /// Extra low-calorie regex alternatives
    pub low_cal_extra: Option<String>,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_GUARDRAIL_VERSION.to_owned(),
            options: GuardrailOptions::default(),
            low_cal_extra: None,
        }
    }
}

impl GuardrailConfig {
    /// Load guardrail configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            version: env_string("GUARDRAIL_VERSION", DEFAULT_GUARDRAIL_VERSION),
            options: GuardrailOptions {
                min_kcal: env_parse("GUARD_KCAL_MIN", DEFAULT_MIN_KCAL),
                max_kcal: env_parse("GUARD_KCAL_MAX", DEFAULT_MAX_KCAL),
                reconcile_tolerance: env_parse("RECONCILE_TOLERANCE", DEFAULT_RECONCILE_TOLERANCE),
            },
            low_cal_extra: env::var("LOW_CAL_REGEX_EXTRA")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Build the runner described by this configuration
    ///
    /// # Errors
    ///
    /// Returns `GuardrailError::InvalidPattern` when `low_cal_extra` does not compile
    pub fn runner(&self) -> Result<GuardrailRunner, GuardrailError> {
        let low_cal = LowCalorieMatcher::new(self.low_cal_extra.as_deref())?;
        Ok(GuardrailRunner::new(
            self.version.clone(),
            self.options,
            low_cal,
        ))
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionConfig {
    /// Estimator switch, model, retries, and breaker
    pub estimator: EstimatorConfig,
    /// Guardrail stages
    pub guardrails: GuardrailConfig,
    /// Rounding tolerance and oil absorption
    pub conservation: ConservationPolicy,
    /// Calorie masking rule
    pub mask_strategy: MaskStrategy,
    /// Response cache
    pub cache: CacheConfig,
    /// Provider stack
    pub provider: ProviderMode,
    /// Catalog candidates considered by the hybrid provider
    pub candidate_limit: usize,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            guardrails: GuardrailConfig::default(),
            conservation: ConservationPolicy::default(),
            mask_strategy: MaskStrategy::default(),
            cache: CacheConfig::default(),
            provider: ProviderMode::default(),
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }
}

impl NutritionConfig {
    /// Load the full configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let provider = env::var("NUTRITION_PROVIDER").map_or(ProviderMode::Ai, |raw| {
            raw.parse().unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring NUTRITION_PROVIDER");
                ProviderMode::Ai
            })
        });

        let config = Self {
            estimator: EstimatorConfig::from_env(),
            guardrails: GuardrailConfig::from_env(),
            conservation: ConservationPolicy {
                atwater_tolerance: ATWATER_TOLERANCE,
                oil: OilAbsorption {
                    min: env_parse("OIL_ABSORPTION_MIN", OIL_ABSORPTION_MIN),
                    mid: env_parse("OIL_ABSORPTION_MID", OIL_ABSORPTION_MID),
                    max: env_parse("OIL_ABSORPTION_MAX", OIL_ABSORPTION_MAX),
                },
            },
            mask_strategy: env::var("CALORIE_MASK_STRATEGY")
                .map_or(MaskStrategy::Never, |raw| MaskStrategy::parse_lossy(&raw)),
            cache: CacheConfig::from_env(),
            provider,
            candidate_limit: env_parse("CANDIDATE_LIMIT", DEFAULT_CANDIDATE_LIMIT).max(1),
        };

        debug!(
            provider = %config.provider,
            ai_enabled = config.estimator.enabled,
            model = %config.estimator.model.model,
            guardrail_version = %config.guardrails.version,
            cache_enabled = config.cache.enabled,
            "Nutrition configuration loaded"
        );
        config
    }

    /// Same configuration with a different provider stack
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderMode) -> Self {
        self.provider = provider;
        self
    }
}

/// Read a trimmed, non-empty variable or fall back to `default`
pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Parse a variable or fall back to `default`
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_mode_parse() {
        assert_eq!(ProviderMode::parse_lossy("HYBRID"), ProviderMode::Hybrid);
        assert_eq!(ProviderMode::parse_lossy(" dict "), ProviderMode::Dict);
        assert_eq!(ProviderMode::parse_lossy("other"), ProviderMode::Ai);
    }

    #[test]
    fn test_mask_strategy_parse() {
        assert_eq!(
            MaskStrategy::parse_lossy("fallback_all_pending"),
            MaskStrategy::FallbackAllPending
        );
        assert_eq!(MaskStrategy::parse_lossy("always"), MaskStrategy::Never);
    }

    #[test]
    fn test_default_runner_compiles() {
        let runner = GuardrailConfig::default().runner().unwrap();
        assert_eq!(runner.version(), DEFAULT_GUARDRAIL_VERSION);
    }
}
