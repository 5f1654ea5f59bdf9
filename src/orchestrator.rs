// ABOUTME: Turns provider output into a finalized, confidence-calibrated analysis result
// ABOUTME: Deterministic substitution, direct or item-based totals, rescue, masking, and slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analysis Orchestrator
//!
//! The provider decides *what* was eaten; the orchestrator decides *how much
//! energy* that is and how far to trust it.
//!
//! 1. No usable items and no direct totals: substitute from archetypes or
//!    keyword rules.
//! 2. Direct totals are trusted and only finalized.
//! 3. Items are aggregated; zero energy triggers an archetype rescue.
//! 4. Any pending item forces confidence to zero.
//! 5. Calories are masked only under the `fallback_all_pending` strategy.
//! 6. Slots are built over the final items and names are resolved for display.

use std::sync::Arc;

use nutrilens_core::constants::adapter::DEFAULT_DISH;
use nutrilens_core::constants::estimator::DEFAULT_CONFIDENCE;
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::{
    AnalysisResult, AnalyzedItem, AtwaterCheck, Breakdown, FallbackLevel, Meta, NutritionFacts,
    NutritionRange, SlotSelection, SourceKind, Totals, WarningSet,
};
use nutrilens_intelligence::name_resolver::resolve_names;
use nutrilens_intelligence::{
    apply_slot, build_slots, match_dish, Aggregator, ArchetypeRegistry, ConservationPolicy,
    DishMatch,
};
use tracing::{info, instrument};

use crate::config::MaskStrategy;
use crate::providers::deterministic::WARN_NO_MATCH;
use crate::providers::{AnalyzeRequest, NutritionProvider, ProviderOutput};

/// Warning attached when a default recipe replaced items without energy
pub const WARN_TEMPLATE_RESCUE: &str = "template_rescue";

/// Path label for trusted direct totals
const PATH_DIRECT: &str = "ai/direct";
/// Path label for item aggregation
const PATH_ITEMS: &str = "item/template";

/// Totals and items after the direct or item branch
struct Computed {
    path: &'static str,
    totals: Totals,
    atwater: AtwaterCheck,
    range: Option<NutritionRange>,
    items: Vec<AnalyzedItem>,
    warnings: WarningSet,
}

/// Pipeline driver over a single provider
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn NutritionProvider>,
    policy: ConservationPolicy,
    mask: MaskStrategy,
}

impl Orchestrator {
    /// Orchestrator with an explicit policy and masking strategy
    #[must_use]
    pub fn new(
        provider: Arc<dyn NutritionProvider>,
        policy: ConservationPolicy,
        mask: MaskStrategy,
    ) -> Self {
        Self {
            provider,
            policy,
            mask,
        }
    }

    /// Name of the wrapped provider
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Analyze a request end to end
    ///
    /// # Errors
    ///
    /// Propagates provider errors; the resilient and deterministic providers
    /// never produce any
    #[instrument(skip(self, request), fields(provider = self.provider.name()))]
    pub async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<AnalysisResult> {
        let output = self.provider.analyze(request).await?;
        Ok(self.finish(&request.text, output))
    }

    /// Finalize provider output for the given input text
    #[must_use]
    pub fn finish(&self, text: &str, mut output: ProviderOutput) -> AnalysisResult {
        let base_confidence = if !output.has_usable_items() && output.direct_totals().is_none() {
            Self::substitute(&mut output, text)
        } else {
            None
        };

        let dish = output
            .dish
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| Some(text.trim().to_owned()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| DEFAULT_DISH.to_owned());

        let mut meta = output.meta;
        let computed = match output.totals.filter(Totals::has_any_positive) {
            Some(totals) => self.compute_direct(totals, output.items, output.warnings),
            None => self.compute_items(&dish, text, output.items, output.warnings, &mut meta),
        };

        let confidence = Self::confidence(&computed, output.confidence, base_confidence);
        let mut nutrition = NutritionFacts::from(computed.totals);
        if self.should_mask(&meta, &computed.items) {
            nutrition.calories = 0.0;
        }

        info!(
            path = computed.path,
            fallback_used = meta.is_fallback(),
            atwater_delta = computed.atwater.delta,
            "nutrition"
        );

        let slots = build_slots(&computed.items, meta.archetype_id.as_deref());
        AnalysisResult {
            dish,
            confidence,
            nutrition,
            atwater: computed.atwater,
            range: computed.range,
            breakdown: Breakdown {
                items: resolve_names(computed.items),
                slots,
                warnings: computed.warnings,
            },
            meta,
        }
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
        apply_slot(items, selection, archetype_id)
    }

    /// Apply a slot answer to a result and recompute its totals
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when the slot answer is rejected
    pub fn refine(
        &self,
        result: &AnalysisResult,
        selection: &SlotSelection,
    ) -> AppResult<AnalysisResult> {
        let items = apply_slot(
            &result.breakdown.items,
            selection,
            result.meta.archetype_id.as_deref(),
        )?;
        let output = ProviderOutput {
            dish: Some(result.dish.clone()),
            totals: None,
            items,
            warnings: result.breakdown.warnings.clone(),
            confidence: Some(result.confidence),
            meta: result.meta.clone(),
        };
        Ok(self.finish(&result.dish, output))
    }

    /// Replace empty output with archetype or keyword items
    ///
    /// Returns the base confidence of the substitution.
    fn substitute(output: &mut ProviderOutput, text: &str) -> Option<f64> {
        let matched = match_dish(text);
        let source_kind = matched.source_kind();
        match matched {
            DishMatch::Archetype(m) => {
                output.meta.substitute(source_kind, FallbackLevel::Substituted);
                output.meta.archetype_id = Some(m.archetype_id.to_owned());
                output.items = m.items;
                Some(m.confidence)
            }
            DishMatch::Keyword(m) => {
                output.meta.substitute(source_kind, FallbackLevel::Substituted);
                output.items = m.items;
                None
            }
            DishMatch::None => {
                output.items.clear();
                output.warnings.insert(WARN_NO_MATCH);
                None
            }
        }
    }

    fn compute_direct(
        &self,
        totals: Totals,
        items: Vec<AnalyzedItem>,
        warnings: WarningSet,
    ) -> Computed {
        let finalized = self.policy.finalize(totals, None, None);
        Computed {
            path: PATH_DIRECT,
            totals: finalized.total,
            atwater: finalized.atwater,
            range: finalized.range,
            items,
            warnings,
        }
    }

    fn compute_items(
        &self,
        dish: &str,
        text: &str,
        items: Vec<AnalyzedItem>,
        warnings: WarningSet,
        meta: &mut Meta,
    ) -> Computed {
        let aggregator = Aggregator::new(self.policy);
        let mut warnings = warnings;
        let mut aggregation = aggregator.compute(&items, dish);

        if !aggregation.has_energy() {
            let registry = ArchetypeRegistry::builtin();
            let rescue = registry
                .find(dish)
                .or_else(|| registry.find(text))
                .filter(|m| !m.items.is_empty());
            if let Some(rescue) = rescue {
                aggregation = aggregator.compute(&rescue.items, rescue.dish);
                warnings.insert(WARN_TEMPLATE_RESCUE);
                meta.substitute(SourceKind::Recipe, FallbackLevel::Rescued);
                meta.archetype_id = Some(rescue.archetype_id.to_owned());
            }
        }

        warnings.extend(aggregation.warnings.iter());
        Computed {
            path: PATH_ITEMS,
            totals: aggregation.totals,
            atwater: aggregation.atwater,
            range: aggregation.range,
            items: aggregation.items,
            warnings,
        }
    }

    /// Zero with pending items or no match, else the first positive candidate
    fn confidence(computed: &Computed, provider: Option<f64>, base: Option<f64>) -> f64 {
        if computed.items.iter().any(|i| i.pending) || computed.warnings.contains(WARN_NO_MATCH) {
            return 0.0;
        }
        [provider, base]
            .into_iter()
            .flatten()
            .find(|c| c.is_finite() && *c > 0.0)
            .map_or(DEFAULT_CONFIDENCE, |c| c.min(1.0))
    }

    fn should_mask(&self, meta: &Meta, items: &[AnalyzedItem]) -> bool {
        self.mask == MaskStrategy::FallbackAllPending
            && meta.is_fallback()
            && !items.is_empty()
            && items.iter().all(|i| i.pending)
    }
}
