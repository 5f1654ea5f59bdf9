// ABOUTME: Dictionary provider answering from archetypes and keyword rules alone
// ABOUTME: Never fails; unknown dishes produce an empty, zero-confidence answer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::iter;

use async_trait::async_trait;
use nutrilens_core::constants::estimator::ARCHETYPE_CONFIDENCE;
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::{FallbackLevel, SourceKind, WarningSet};
use nutrilens_intelligence::{match_dish, DishMatch};
use tracing::debug;

use super::{AnalyzeRequest, NutritionProvider, ProviderOutput};
use crate::adapters::make_meta;

/// Warning attached when neither an archetype nor a keyword rule matched
pub const WARN_NO_MATCH: &str = "no_match";

/// Provider identifier reported in `meta.provider`
const PROVIDER_NAME: &str = "dict";

/// Deterministic archetype and keyword provider
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicProvider;

impl DeterministicProvider {
    /// Create the provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve free text to template items
    #[must_use]
    pub fn resolve(&self, text: &str) -> ProviderOutput {
        let trimmed = text.trim();
        let matched = match_dish(trimmed);
        debug!(matched = matched.is_match(), "Dictionary lookup");

        let dish = if trimmed.is_empty() {
            matched.dish().map(str::to_owned)
        } else {
            Some(trimmed.to_owned())
        };

        let (meta, confidence, warnings) = match &matched {
            DishMatch::Archetype(m) => (
                make_meta(
                    SourceKind::Template,
                    FallbackLevel::Substituted,
                    Some(m.archetype_id),
                ),
                Some(m.confidence.max(ARCHETYPE_CONFIDENCE)),
                WarningSet::new(),
            ),
            DishMatch::Keyword(_) => (
                make_meta(SourceKind::Keyword, FallbackLevel::Substituted, None),
                None,
                WarningSet::new(),
            ),
            DishMatch::None => (
                make_meta(SourceKind::Ai, FallbackLevel::Trusted, None),
                Some(0.0),
                iter::once(WARN_NO_MATCH).collect(),
            ),
        };

        ProviderOutput {
            dish,
            totals: None,
            items: matched.into_items(),
            warnings,
            confidence,
            meta: meta.with_extra("provider", PROVIDER_NAME),
        }
    }
}

#[async_trait]
impl NutritionProvider for DeterministicProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<ProviderOutput> {
        Ok(self.resolve(&request.text))
    }
}
