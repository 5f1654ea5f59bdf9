// ABOUTME: Estimator provider wrapped in timeout, retry, circuit breaker, and dictionary fallback
// ABOUTME: Never fails; every estimator failure degrades to the deterministic provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resilient Estimator Provider
//!
//! Attempts run strictly in sequence:
//!
//! ```text
//! AI_ATTEMPT → OK ─────────────────────────────→ DONE
//!            → PERMANENT_FAIL (trip breaker) ──→ DICT_FALLBACK
//!            → TRANSIENT_FAIL → backoff → AI_ATTEMPT (up to max_retries)
//!                             → exhausted ─────→ DICT_FALLBACK
//! ```
//!
//! A success slower than the latency ceiling is discarded and counted as a
//! breaker failure. Only the estimator call and the backoff sleep suspend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nutrilens_core::constants::guardrails::DEFAULT_GUARDRAIL_VERSION;
use nutrilens_core::constants::resilience::reasons::{
    AI_CIRCUIT_OPEN, AI_DISABLED, DICT_ERROR, DICT_PERMANENT_ERROR, DICT_UNAVAILABLE,
};
use nutrilens_core::constants::resilience::WARN_AI_FALLBACK_DICT;
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::Meta;
use nutrilens_providers::{CircuitBreaker, EstimatorError, RetryPolicy};
use serde_json::{Map, Value};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use super::{
    AnalyzeRequest, DeterministicProvider, EstimatorProvider, NutritionProvider, ProviderOutput,
};
use crate::config::{EstimatorConfig, ModelInfo};

/// Provider identifier reported in `meta.provider`
const PROVIDER_NAME: &str = "ai";

/// Retry, latency, and provenance settings for the resilient provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Estimator calls allowed at all
    pub enabled: bool,
    /// Attempt budget and backoff
    pub retry: RetryPolicy,
    /// Model identifiers stamped into meta
    pub model: ModelInfo,
    /// Guardrail release stamped into meta
    pub guardrail_version: String,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retry: RetryPolicy::default(),
            model: ModelInfo::default(),
            guardrail_version: DEFAULT_GUARDRAIL_VERSION.to_owned(),
        }
    }
}

impl ResilienceConfig {
    /// Build from the estimator configuration and the active guardrail version
    #[must_use]
    pub fn from_estimator(estimator: &EstimatorConfig, guardrail_version: &str) -> Self {
        Self {
            enabled: estimator.enabled,
            retry: estimator.retry,
            model: estimator.model.clone(),
            guardrail_version: guardrail_version.to_owned(),
        }
    }
}

/// How a run of attempts ended without a usable answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exhausted {
    Permanent,
    Transient,
    TooSlow,
}

impl Exhausted {
    const fn reason(self) -> &'static str {
        match self {
            Self::Permanent => DICT_PERMANENT_ERROR,
            Self::Transient => DICT_ERROR,
            Self::TooSlow => DICT_UNAVAILABLE,
        }
    }
}

/// Estimator with retries, breaker, and dictionary fallback
pub struct ResilientProvider {
    estimator: EstimatorProvider,
    fallback: DeterministicProvider,
    breaker: Arc<CircuitBreaker>,
    config: ResilienceConfig,
}

impl ResilientProvider {
    /// Wrap an estimator provider with a shared breaker
    #[must_use]
    pub fn new(
        estimator: EstimatorProvider,
        breaker: Arc<CircuitBreaker>,
        config: ResilienceConfig,
    ) -> Self {
        Self {
            estimator,
            fallback: DeterministicProvider::new(),
            breaker,
            config,
        }
    }

    /// Breaker guarding the estimator
    #[must_use]
    pub const fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Active settings
    #[must_use]
    pub const fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    fn base_meta(&self, request_id: &str) -> Map<String, Value> {
        let model = &self.config.model;
        let mut base = Map::new();
        base.insert("provider".to_owned(), PROVIDER_NAME.into());
        base.insert("model".to_owned(), model.model.clone().into());
        base.insert("model_version".to_owned(), model.model_version.clone().into());
        base.insert("prompt_version".to_owned(), model.prompt_version.clone().into());
        base.insert("request_id".to_owned(), request_id.into());
        base
    }

    /// Add base fields the output does not already carry
    fn merge_base(&self, meta: &mut Meta, base: &Map<String, Value>) {
        for (key, value) in base {
            meta.extra.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if meta.guardrail_version.is_none() {
            meta.guardrail_version = Some(self.config.guardrail_version.clone());
        }
    }

    /// One attempt bounded by the per-attempt timeout
    async fn attempt(
        &self,
        request: &AnalyzeRequest,
    ) -> (Result<ProviderOutput, EstimatorError>, Duration) {
        let started = Instant::now();
        let result = timeout(self.config.retry.timeout(), self.estimator.estimate(request))
            .await
            .unwrap_or(Err(EstimatorError::Timeout {
                timeout_ms: self.config.retry.timeout_ms,
            }));
        (result, started.elapsed())
    }

    /// Run attempts until one succeeds in time or the budget is spent
    async fn run_attempts(
        &self,
        request: &AnalyzeRequest,
        request_id: &str,
    ) -> Result<(ProviderOutput, Duration), Exhausted> {
        let retry = self.config.retry;
        let attempts = retry.attempts();

        for attempt in 0..attempts {
            let (result, elapsed) = self.attempt(request).await;
            let latency_ms = elapsed.as_millis() as u64;

            match result {
                Ok(_) if elapsed > retry.max_latency() => {
                    self.breaker.record_failure();
                    warn!(request_id, attempt, latency_ms, "latency_exceeded");
                }
                Ok(output) => {
                    self.breaker.record_success();
                    return Ok((output, elapsed));
                }
                Err(err) => {
                    self.breaker.record_failure();
                    if err.is_permanent(retry.retry_on_429) {
                        self.breaker.trip();
                        warn!(request_id, attempt, error = %err, "Permanent estimator error");
                        return Err(Exhausted::Permanent);
                    }
                    error!(request_id, attempt, error = %err, "Estimator attempt failed");
                    if attempt + 1 >= attempts {
                        return Err(Exhausted::Transient);
                    }
                    sleep(retry.delay_for_attempt(attempt)).await;
                }
            }
        }
        Err(Exhausted::TooSlow)
    }

    /// Dictionary answer tagged with the fallback reason
    fn fall_back(
        &self,
        request: &AnalyzeRequest,
        request_id: &str,
        reason: &str,
        base: &Map<String, Value>,
    ) -> ProviderOutput {
        info!(request_id, reason, "Falling back to dictionary");
        let mut output = self.fallback.resolve(&request.text);
        output.warnings.insert(WARN_AI_FALLBACK_DICT);
        output.warnings.insert(reason);
        self.merge_base(&mut output.meta, base);
        output.meta.insert("fallback", reason);
        output
    }
}

#[async_trait]
impl NutritionProvider for ResilientProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<ProviderOutput> {
        let request_id = request.request_id();
        let base = self.base_meta(&request_id);

        if !self.config.enabled {
            warn!(request_id, "Estimator disabled");
            return Ok(self.fall_back(request, &request_id, AI_DISABLED, &base));
        }
        if self.breaker.is_open() {
            warn!(request_id, "Estimator circuit open");
            return Ok(self.fall_back(request, &request_id, AI_CIRCUIT_OPEN, &base));
        }

        match self.run_attempts(request, &request_id).await {
            Ok((mut output, elapsed)) => {
                self.merge_base(&mut output.meta, &base);
                output.meta.insert("latency_ms", elapsed.as_millis() as u64);
                Ok(output)
            }
            Err(exhausted) => Ok(self.fall_back(request, &request_id, exhausted.reason(), &base)),
        }
    }
}
