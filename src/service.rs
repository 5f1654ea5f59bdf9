// ABOUTME: Service facade owning the provider stack, the breaker, and the response cache
// ABOUTME: Cached analysis, slot refinement, and guardrail hardening before persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use nutrilens_core::constants::guardrails::WARN_GUARDRAIL_FAILED;
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::{
    AnalysisResult, AnalyzedItem, CanonicalPayload, GuardedPayload, SlotSelection, WarningSet,
};
use nutrilens_intelligence::{GuardrailContext, GuardrailRunner};
use nutrilens_providers::CircuitBreaker;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::cache::{cache_key, CacheKeyParts, ResponseCache};
use crate::config::{NutritionConfig, ProviderMode};
use crate::llm::{DisabledEstimator, EstimatorClient, GeminiEstimator};
use crate::orchestrator::Orchestrator;
use crate::providers::{
    AnalyzeRequest, CatalogFirstProvider, DeterministicProvider, EstimatorProvider,
    NutritionProvider, ResilienceConfig, ResilientProvider,
};

/// Breaker name used in log lines
const BREAKER_NAME: &str = "estimator";

/// Long-lived entry point for nutrition analysis
#[derive(Clone)]
pub struct NutritionService {
    orchestrator: Arc<Orchestrator>,
    cache: Option<ResponseCache<AnalysisResult>>,
    runner: GuardrailRunner,
    config: NutritionConfig,
}

impl NutritionService {
    /// Build the provider stack selected by `config.provider`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the guardrail allowlist does not compile
    pub fn from_config(
        config: NutritionConfig,
        client: Arc<dyn EstimatorClient>,
        breaker: Arc<CircuitBreaker>,
    ) -> AppResult<Self> {
        let runner = config.guardrails.runner()?;
        let provider = Self::build_provider(&config, client, breaker);
        let orchestrator = Orchestrator::new(provider, config.conservation, config.mask_strategy);
        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::from_config(&config.cache));

        info!(
            provider = %config.provider,
            cache_enabled = cache.is_some(),
            guardrail_version = %runner.version(),
            "Nutrition service ready"
        );
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            cache,
            runner,
            config,
        })
    }

    /// Service configured from the environment
    ///
    /// Without `GEMINI_API_KEY` the estimator is disabled and every request
    /// is answered from deterministic knowledge.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the guardrail allowlist does not compile
    pub fn from_env() -> AppResult<Self> {
        Self::with_env_client(NutritionConfig::from_env())
    }

    /// Service over an explicit configuration, with the estimator client
    /// taken from the environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the guardrail allowlist does not compile
    pub fn with_env_client(mut config: NutritionConfig) -> AppResult<Self> {
        let client: Arc<dyn EstimatorClient> = match GeminiEstimator::from_env() {
            Ok(gemini) => Arc::new(gemini.with_model(config.estimator.model.model.clone())),
            Err(err) => {
                warn!(error = %err, "Estimator disabled");
                config.estimator.enabled = false;
                Arc::new(DisabledEstimator::new(err.message))
            }
        };
        let breaker = Arc::new(CircuitBreaker::with_config(
            BREAKER_NAME,
            config.estimator.circuit,
        ));
        Self::from_config(config, client, breaker)
    }

    fn build_provider(
        config: &NutritionConfig,
        client: Arc<dyn EstimatorClient>,
        breaker: Arc<CircuitBreaker>,
    ) -> Arc<dyn NutritionProvider> {
        let resilient = || {
            let estimator = EstimatorProvider::new(Arc::clone(&client))
                .with_prompt_version(config.estimator.model.prompt_version.clone());
            let resilience =
                ResilienceConfig::from_estimator(&config.estimator, &config.guardrails.version);
            ResilientProvider::new(estimator, Arc::clone(&breaker), resilience)
        };

        match config.provider {
            ProviderMode::Ai => Arc::new(resilient()),
            ProviderMode::Hybrid => Arc::new(
                CatalogFirstProvider::new(Arc::new(resilient()))
                    .with_candidate_limit(config.candidate_limit),
            ),
            ProviderMode::Dict => Arc::new(DeterministicProvider::new()),
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &NutritionConfig {
        &self.config
    }

    /// Key under which a request's result is cached
    #[must_use]
    pub fn cache_key(&self, request: &AnalyzeRequest) -> String {
        let model = &self.config.estimator.model;
        cache_key(&CacheKeyParts {
            text: &request.text,
            locale: &request.locale,
            provider: self.config.provider.as_str(),
            model: &model.model,
            model_version: &model.model_version,
            prompt_version: &model.prompt_version,
            guardrail_version: &self.config.guardrails.version,
        })
    }

    /// Analyze a request, serving repeats from the cache
    ///
    /// Requests carrying an image or catalog candidates bypass the cache
    /// because the key covers text only.
    ///
    /// # Errors
    ///
    /// Propagates orchestrator errors
    #[instrument(skip(self, request), fields(provider = %self.config.provider))]
    pub async fn analyze(&self, request: AnalyzeRequest) -> AppResult<AnalysisResult> {
        let cache = match &self.cache {
            Some(cache) if request.image.is_none() && request.catalog_candidates.is_empty() => {
                cache
            }
            _ => return self.analyze_uncached(&request).await,
        };

        let key = self.cache_key(&request);
        let orchestrator = Arc::clone(&self.orchestrator);
        cache
            .get_or_compute(&key, async move { orchestrator.analyze(&request).await })
            .await
    }

    /// Analyze a request without touching the cache
    ///
    /// # Errors
    ///
    /// Propagates orchestrator errors
    pub async fn analyze_uncached(&self, request: &AnalyzeRequest) -> AppResult<AnalysisResult> {
        self.orchestrator.analyze(request).await
    }

    /// Apply a slot answer to an item list
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for unknown keys or unusable values
    pub fn apply_slot(
        items: &[AnalyzedItem],
        selection: &SlotSelection,
        archetype_id: Option<&str>,
    ) -> AppResult<Vec<AnalyzedItem>> {
        Orchestrator::apply_slot(items, selection, archetype_id)
    }

    /// Apply a slot answer to a result and recompute it
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when the slot answer is rejected
    pub fn refine(
        &self,
        result: &AnalysisResult,
        selection: &SlotSelection,
    ) -> AppResult<AnalysisResult> {
        self.orchestrator.refine(result, selection)
    }

    /// Run the guardrails over a result before it is persisted
    ///
    /// Never fails: a payload the guardrails reject becomes a zero payload
    /// tagged `guardrail_failed`.
    #[must_use]
    pub fn harden(&self, result: &AnalysisResult, input_text: &str) -> GuardedPayload {
        let raw = Self::raw_payload(result);
        let mut guarded = match self.runner.run(&raw, &GuardrailContext::for_text(input_text)) {
            Ok(guarded) => guarded,
            Err(err) => {
                warn!(error = %err, "Guardrails rejected analysis result");
                self.failed_payload(&result.dish, &err.to_string())
            }
        };
        self.stamp_provenance(&mut guarded);
        guarded
    }

    fn raw_payload(result: &AnalysisResult) -> Value {
        json!({
            "dish": result.dish,
            "nutrition": result.nutrition,
            "items": result.breakdown.items,
            "warnings": result.breakdown.warnings,
            "confidence": result.confidence,
            "meta": result.meta,
        })
    }

    fn failed_payload(&self, dish: &str, message: &str) -> GuardedPayload {
        let mut warnings = WarningSet::new();
        warnings.insert(WARN_GUARDRAIL_FAILED);
        warnings.insert(message);

        let mut payload = CanonicalPayload {
            dish: Some(dish.to_owned()),
            warnings,
            confidence: Some(0.0),
            ..CanonicalPayload::default()
        };
        payload
            .meta
            .insert("guardrail_error".to_owned(), Value::String(message.to_owned()));
        payload.meta.insert(
            "guardrail_version".to_owned(),
            Value::String(self.runner.version().to_owned()),
        );
        GuardedPayload::from_payload(payload)
    }

    fn stamp_provenance(&self, guarded: &mut GuardedPayload) {
        let model = &self.config.estimator.model;
        let stamps = [
            ("provider", self.config.provider.as_str()),
            ("model", model.model.as_str()),
            ("model_version", model.model_version.as_str()),
            ("prompt_version", model.prompt_version.as_str()),
            ("guardrail_version", self.runner.version()),
        ];
        for (key, value) in stamps {
            guarded
                .payload
                .meta
                .insert(key.to_owned(), Value::String(value.to_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_service() -> NutritionService {
        let config = NutritionConfig::default().with_provider(ProviderMode::Dict);
        NutritionService::from_config(
            config,
            Arc::new(DisabledEstimator::new("test")),
            Arc::new(CircuitBreaker::new(BREAKER_NAME)),
        )
        .unwrap()
    }

    #[test]
    fn test_cache_key_tracks_provider() {
        let dict = dict_service();
        let request = AnalyzeRequest::new("牛丼");
        let mut hybrid_config = dict.config().clone();
        hybrid_config.provider = ProviderMode::Hybrid;
        let hybrid = NutritionService::from_config(
            hybrid_config,
            Arc::new(DisabledEstimator::new("test")),
            Arc::new(CircuitBreaker::new(BREAKER_NAME)),
        )
        .unwrap();
        assert_ne!(dict.cache_key(&request), hybrid.cache_key(&request));
    }

    #[tokio::test]
    async fn test_harden_stamps_provenance() {
        let service = dict_service();
        let result = service.analyze(AnalyzeRequest::new("牛丼")).await.unwrap();
        let guarded = service.harden(&result, "牛丼");
        assert_eq!(guarded.payload.meta["provider"], "dict");
        assert_eq!(
            guarded.payload.meta["guardrail_version"],
            service.config().guardrails.version.as_str()
        );
        assert!(guarded.nutrition.calories > 0.0);
    }
}
