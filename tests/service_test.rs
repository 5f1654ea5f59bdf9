// ABOUTME: Integration tests for the nutrition service facade
// ABOUTME: Provider selection, response caching, hybrid catalog answers, and guardrail hardening
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{breaker, fast_retry, init_test_logging, katsu_answer, ScriptedEstimator, Step};
use nutrilens::config::{NutritionConfig, ProviderMode};
use nutrilens::providers::{AnalyzeRequest, CatalogCandidate};
use nutrilens::service::NutritionService;
use nutrilens::SlotSelection;
use nutrilens_core::constants::resilience::WARN_AI_FALLBACK_DICT;
use nutrilens_core::models::SourceKind;

fn config(provider: ProviderMode) -> NutritionConfig {
    let mut config = NutritionConfig::default().with_provider(provider);
    config.estimator.retry = fast_retry();
    config
}

fn service(config: NutritionConfig, client: &Arc<ScriptedEstimator>) -> NutritionService {
    NutritionService::from_config(config, Arc::clone(client) as _, breaker(5)).unwrap()
}

#[tokio::test]
async fn test_repeated_requests_are_served_from_cache() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer()), Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Ai), &client);

    let (a, b) = tokio::join!(
        service.analyze(AnalyzeRequest::new("とんかつ定食")),
        service.analyze(AnalyzeRequest::new("  とんかつ定食 ")),
    );
    let third = service
        .analyze(AnalyzeRequest::new("とんかつ定食"))
        .await
        .unwrap();

    assert_eq!(client.calls(), 1);
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(third.meta.source_kind, SourceKind::Ai);
}

#[tokio::test]
async fn test_cache_can_be_disabled() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer()), Step::ok(katsu_answer())]);
    let mut config = config(ProviderMode::Ai);
    config.cache.enabled = false;
    let service = service(config, &client);

    service.analyze(AnalyzeRequest::new("とんかつ定食")).await.unwrap();
    service.analyze(AnalyzeRequest::new("とんかつ定食")).await.unwrap();

    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_uncached_path_always_calls_provider() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer()), Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Ai), &client);
    let request = AnalyzeRequest::new("とんかつ定食");

    service.analyze_uncached(&request).await.unwrap();
    service.analyze_uncached(&request).await.unwrap();

    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_dict_mode_never_calls_estimator() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Dict), &client);

    let result = service.analyze(AnalyzeRequest::new("牛丼")).await.unwrap();

    assert_eq!(client.calls(), 0);
    assert_eq!(result.meta.archetype_id.as_deref(), Some("gyudon"));
    assert!(!result.breakdown.warnings.contains(WARN_AI_FALLBACK_DICT));
}

#[tokio::test]
async fn test_hybrid_prefers_catalog_candidates() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Hybrid), &client);
    let request = AnalyzeRequest::new("鮭おにぎり").with_candidates(vec![CatalogCandidate {
        name: Some("鮭おにぎり".to_owned()),
        code: Some("4901234567890".to_owned()),
        confidence: Some(0.95),
        kcal_serv: Some(180.0),
        p_serv: Some(4.5),
        f_serv: Some(1.2),
        c_serv: Some(38.0),
        ..CatalogCandidate::default()
    }]);

    let result = service.analyze(request).await.unwrap();

    assert_eq!(client.calls(), 0);
    assert!((result.nutrition.calories - 180.0).abs() < f64::EPSILON);
    assert_eq!(result.meta.extra["catalog_hit"], true);
    assert_eq!(result.meta.extra["provider"], "hybrid");
}

#[tokio::test]
async fn test_hybrid_without_candidates_uses_estimator() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Hybrid), &client);

    let result = service
        .analyze(AnalyzeRequest::new("とんかつ定食"))
        .await
        .unwrap();

    assert_eq!(client.calls(), 1);
    assert_eq!(result.meta.extra["fallback"], "ai");
}

#[tokio::test]
async fn test_harden_keeps_plausible_result() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Ai), &client);
    let result = service
        .analyze(AnalyzeRequest::new("とんかつ定食"))
        .await
        .unwrap();

    let guarded = service.harden(&result, "とんかつ定食");

    assert!((guarded.nutrition.calories - result.nutrition.calories).abs() <= 1.0);
    assert_eq!(guarded.payload.meta["provider"], "ai");
    assert_eq!(
        guarded.payload.meta["model_version"],
        service.config().estimator.model.model_version.as_str()
    );
    assert_eq!(guarded.breakdown.items.len(), result.breakdown.items.len());
}

#[tokio::test]
async fn test_refine_through_service() {
    init_test_logging();
    let client = ScriptedEstimator::new([Step::ok(katsu_answer())]);
    let service = service(config(ProviderMode::Ai), &client);
    let result = service
        .analyze(AnalyzeRequest::new("とんかつ定食"))
        .await
        .unwrap();

    let refined = service
        .refine(&result, &SlotSelection::new("rice_size", 300.0))
        .unwrap();

    assert!(refined.nutrition.calories > result.nutrition.calories);
    assert!(service
        .refine(&result, &SlotSelection::new("rice_size", "lots"))
        .is_err());
}
