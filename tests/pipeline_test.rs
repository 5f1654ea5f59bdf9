// ABOUTME: Integration tests for aggregation, rounding, dish matching, masking, and slot refinement
// ABOUTME: Exercises the orchestrator over the deterministic provider and the pure stages directly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::init_test_logging;
use nutrilens::config::MaskStrategy;
use nutrilens::orchestrator::Orchestrator;
use nutrilens::providers::{AnalyzeRequest, DeterministicProvider, ProviderOutput};
use nutrilens::{AnalyzedItem, SlotSelection};
use nutrilens_core::models::{FallbackLevel, SourceKind, Totals};
use nutrilens_intelligence::{
    compute_from_items, finalize_totals, match_dish, ConservationPolicy, DishMatch,
};

fn orchestrator(mask: MaskStrategy) -> Orchestrator {
    Orchestrator::new(
        Arc::new(DeterministicProvider::new()),
        ConservationPolicy::default(),
        mask,
    )
}

fn kcal_of(items: &[AnalyzedItem], dish: &str) -> f64 {
    compute_from_items(items, dish).totals.kcal
}

#[test]
fn test_more_grams_means_more_energy() {
    let small = kcal_of(&[AnalyzedItem::from_code("rice_cooked", 150.0)], "ごはん");
    let large = kcal_of(&[AnalyzedItem::from_code("rice_cooked", 300.0)], "ごはん");
    assert!(small > 0.0);
    assert!(large > small);
}

#[test]
fn test_loin_cutlet_outweighs_fillet() {
    let loin = kcal_of(&[AnalyzedItem::from_code("pork_loin_cutlet", 120.0)], "とんかつ");
    let fillet = kcal_of(&[AnalyzedItem::from_code("pork_fillet_cutlet", 120.0)], "とんかつ");
    assert!(loin > fillet, "loin {loin} should exceed fillet {fillet}");
}

#[test]
fn test_rounding_happens_once() {
    let finalized = finalize_totals(Totals::new(379.8, 23.47, 22.66, 20.28), None, None);
    assert!((finalized.total.protein_g - 23.5).abs() < f64::EPSILON);
    assert!((finalized.total.fat_g - 22.7).abs() < f64::EPSILON);
    assert!((finalized.total.carbs_g - 20.3).abs() < f64::EPSILON);
    assert!((finalized.total.kcal - 380.0).abs() < f64::EPSILON);
    assert!(finalized.atwater.delta.abs() <= 0.02);
    assert!(finalized.atwater.pass);
}

#[test]
fn test_bands_become_range() {
    let finalized = finalize_totals(
        Totals::new(380.0, 20.0, 20.0, 30.0),
        Some(Totals::new(362.0, 20.0, 18.0, 30.0)),
        Some(Totals::new(407.0, 20.0, 23.0, 30.0)),
    );
    let range = finalized.range.unwrap();
    assert!((range.kcal[0] - 362.0).abs() < f64::EPSILON);
    assert!((range.kcal[1] - 407.0).abs() < f64::EPSILON);
    assert!((finalized.total.kcal - 380.0).abs() < f64::EPSILON);
}

#[test]
fn test_deep_fried_dish_gets_range() {
    let items = [
        AnalyzedItem::from_code("pork_loin_cutlet", 120.0),
        AnalyzedItem::from_code("rice_cooked", 200.0),
    ];
    let aggregation = compute_from_items(&items, "とんかつ定食");
    let range = aggregation.range.unwrap();
    assert!(range.kcal[0] <= aggregation.totals.kcal);
    assert!(aggregation.totals.kcal <= range.kcal[1]);
    assert!(range.kcal[0] < range.kcal[1]);
}

#[test]
fn test_known_dishes_match_archetypes() {
    for (text, id) in [
        ("牛丼", "gyudon"),
        ("とんかつ定食", "tonkatsu_teishoku"),
        ("焼き魚定食", "yakizakana_teishoku"),
    ] {
        let matched = match_dish(text);
        assert!(
            matches!(
                matched.source_kind(),
                SourceKind::Template | SourceKind::Recipe
            ),
            "{text} matched as {:?}",
            matched.source_kind()
        );
        assert_eq!(matched.archetype_id(), Some(id));
        let DishMatch::Archetype(archetype) = matched else {
            panic!("{text} did not match an archetype");
        };
        assert!(!archetype.items.is_empty());
    }
}

#[tokio::test]
async fn test_archetype_result_has_slots_and_zero_confidence() {
    init_test_logging();
    let result = orchestrator(MaskStrategy::Never)
        .analyze(&AnalyzeRequest::new("とんかつ定食"))
        .await
        .unwrap();

    assert_eq!(result.meta.source_kind, SourceKind::Template);
    assert_eq!(result.meta.fallback_level, FallbackLevel::Substituted);
    assert!(result.nutrition.calories > 0.0);
    assert!(result.confidence.abs() < f64::EPSILON);
    assert!(result.all_items_pending());
    assert!(result.breakdown.slots.contains_key("portion_size"));
    assert!(result.breakdown.slots.contains_key("pork_cut"));
    assert!(result.range.is_some());
}

#[tokio::test]
async fn test_masking_guard_is_narrow() {
    init_test_logging();
    let masked = orchestrator(MaskStrategy::FallbackAllPending);

    let fallback = masked.analyze(&AnalyzeRequest::new("牛丼")).await.unwrap();
    assert!(fallback.nutrition.calories.abs() < f64::EPSILON);
    assert!(fallback.nutrition.protein_g > 0.0);

    let confirmed = ProviderOutput {
        items: vec![AnalyzedItem::from_code("rice_cooked", 200.0)],
        confidence: Some(0.9),
        ..ProviderOutput::default()
    };
    let trusted = masked.finish("ごはん", confirmed);
    assert!(trusted.nutrition.calories > 0.0);

    let no_match = masked.analyze(&AnalyzeRequest::new("謎の料理")).await.unwrap();
    assert!(no_match.breakdown.items.is_empty());
    assert!(no_match.nutrition.calories.abs() < f64::EPSILON);
    assert!(no_match.confidence.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_refine_confirms_portion() {
    init_test_logging();
    let orchestrator = orchestrator(MaskStrategy::Never);
    let base = orchestrator
        .analyze(&AnalyzeRequest::new("牛丼"))
        .await
        .unwrap();

    let large = orchestrator
        .refine(&base, &SlotSelection::new("portion_size", "large"))
        .unwrap();

    assert!(!large.all_items_pending());
    assert!(large.nutrition.calories > base.nutrition.calories);
    assert_eq!(large.meta.archetype_id.as_deref(), Some("gyudon"));
}

#[tokio::test]
async fn test_pork_cut_slot_switches_code() {
    init_test_logging();
    let items = vec![
        AnalyzedItem::from_code("pork_loin_cutlet", 120.0),
        AnalyzedItem::from_code("rice_cooked", 200.0),
    ];
    let updated =
        Orchestrator::apply_slot(&items, &SlotSelection::new("pork_cut", "ヒレ"), None).unwrap();
    assert_eq!(updated[0].code.as_deref(), Some("pork_fillet_cutlet"));
    assert_eq!(items[0].code.as_deref(), Some("pork_loin_cutlet"));

    let again =
        Orchestrator::apply_slot(&updated, &SlotSelection::new("pork_cut", "ヒレ"), None).unwrap();
    assert_eq!(again, updated);
}

#[test]
fn test_invalid_slot_answers_are_rejected() {
    let items = vec![AnalyzedItem::from_code("rice_cooked", 200.0)];
    assert!(Orchestrator::apply_slot(&items, &SlotSelection::new("rice_size", 0.0), None).is_err());
    assert!(Orchestrator::apply_slot(&items, &SlotSelection::new("spice", "hot"), None).is_err());
    assert!(
        Orchestrator::apply_slot(&items, &SlotSelection::new("portion_size", "large"), None)
            .is_err()
    );
}
