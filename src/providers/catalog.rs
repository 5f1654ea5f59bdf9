// ABOUTME: Hybrid provider that answers from food catalog candidates before asking an inner provider
// ABOUTME: Candidate totals come from per-serving values first, then per-100 g values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use nutrilens_core::constants::estimator::{CATALOG_LOW_CONFIDENCE, DEFAULT_CANDIDATE_LIMIT};
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::{Meta, Totals, WarningSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{AnalyzeRequest, NutritionProvider, ProviderOutput};

/// Provider identifier reported in `meta.provider`
const PROVIDER_NAME: &str = "hybrid";

/// Warning attached to catalog hits below the confidence threshold
pub const WARN_DB_LOW_CONFIDENCE: &str = "db_low_confidence";

/// Food catalog search hit supplied by the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogCandidate {
    /// Product or dish name
    #[serde(default)]
    pub name: Option<String>,
    /// Catalog code (barcode or internal id)
    #[serde(default)]
    pub code: Option<String>,
    /// Search confidence in `[0, 1]`
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Explicit totals, preferred over the per-serving fields
    #[serde(default)]
    pub totals: Option<Totals>,
    /// kcal per serving
    #[serde(default)]
    pub kcal_serv: Option<f64>,
    /// kcal per 100 g
    #[serde(default)]
    pub kcal_100g: Option<f64>,
    /// Protein per serving
    #[serde(default)]
    pub p_serv: Option<f64>,
    /// Protein per 100 g
    #[serde(default)]
    pub p_100g: Option<f64>,
    /// Fat per serving
    #[serde(default)]
    pub f_serv: Option<f64>,
    /// Fat per 100 g
    #[serde(default)]
    pub f_100g: Option<f64>,
    /// Carbohydrate per serving
    #[serde(default)]
    pub c_serv: Option<f64>,
    /// Carbohydrate per 100 g
    #[serde(default)]
    pub c_100g: Option<f64>,
}

impl CatalogCandidate {
    /// Totals for one serving, falling back to 100 g values field by field
    #[must_use]
    pub fn resolved_totals(&self) -> Totals {
        self.totals.unwrap_or_else(|| {
            Totals::new(
                self.kcal_serv.or(self.kcal_100g).unwrap_or(0.0),
                self.p_serv.or(self.p_100g).unwrap_or(0.0),
                self.f_serv.or(self.f_100g).unwrap_or(0.0),
                self.c_serv.or(self.c_100g).unwrap_or(0.0),
            )
        })
    }
}

/// Catalog candidates first, inner provider otherwise
#[derive(Clone)]
pub struct CatalogFirstProvider {
    inner: Arc<dyn NutritionProvider>,
    candidate_limit: usize,
}

impl CatalogFirstProvider {
    /// Wrap an inner provider
    #[must_use]
    pub fn new(inner: Arc<dyn NutritionProvider>) -> Self {
        Self {
            inner,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    /// Candidates considered per request
    #[must_use]
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit.max(1);
        self
    }

    /// Answer from the best candidate, if any
    fn from_catalog(&self, request: &AnalyzeRequest) -> Option<ProviderOutput> {
        let top = request.catalog_candidates.first()?;
        let considered = request.catalog_candidates.len().min(self.candidate_limit);

        let confidence = top.confidence.unwrap_or(0.0);
        let mut warnings = WarningSet::new();
        if confidence < CATALOG_LOW_CONFIDENCE {
            warnings.insert(WARN_DB_LOW_CONFIDENCE);
        }

        let dish = top
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(request.text.clone()).filter(|t| !t.trim().is_empty()));

        let meta = Meta::ai()
            .with_extra("provider", PROVIDER_NAME)
            .with_extra("source", "catalog")
            .with_extra("code", top.code.clone())
            .with_extra("catalog_hit", true)
            .with_extra("candidates", considered);

        Some(ProviderOutput {
            dish,
            totals: Some(top.resolved_totals()),
            items: Vec::new(),
            warnings,
            confidence: top.confidence,
            meta,
        })
    }
}

#[async_trait]
impl NutritionProvider for CatalogFirstProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, request), fields(candidates = request.catalog_candidates.len()))]
    async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<ProviderOutput> {
        if let Some(output) = self.from_catalog(request) {
            debug!("Catalog hit");
            return Ok(output);
        }

        let mut output = self.inner.analyze(request).await?;
        output.meta.insert("provider", PROVIDER_NAME);
        output.meta.insert("fallback", "ai");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::DeterministicProvider;

    fn provider() -> CatalogFirstProvider {
        CatalogFirstProvider::new(Arc::new(DeterministicProvider::new()))
    }

    #[test]
    fn test_serving_values_preferred() {
        let candidate = CatalogCandidate {
            kcal_serv: Some(250.0),
            kcal_100g: Some(500.0),
            p_100g: Some(8.0),
            ..CatalogCandidate::default()
        };
        assert_eq!(candidate.resolved_totals(), Totals::new(250.0, 8.0, 0.0, 0.0));
    }

    #[tokio::test]
    async fn test_low_confidence_hit() {
        let request = AnalyzeRequest::new("おにぎり").with_candidates(vec![CatalogCandidate {
            name: Some("鮭おにぎり".to_owned()),
            code: Some("4901234".to_owned()),
            confidence: Some(0.5),
            kcal_serv: Some(180.0),
            ..CatalogCandidate::default()
        }]);
        let output = provider().analyze(&request).await.unwrap();
        assert_eq!(output.dish.as_deref(), Some("鮭おにぎり"));
        assert!(output.warnings.contains(WARN_DB_LOW_CONFIDENCE));
        assert_eq!(output.meta.extra["catalog_hit"], true);
        assert_eq!(output.meta.extra["code"], "4901234");
    }

    #[tokio::test]
    async fn test_delegates_without_candidates() {
        let output = provider().analyze(&AnalyzeRequest::new("牛丼")).await.unwrap();
        assert_eq!(output.meta.extra["provider"], "hybrid");
        assert_eq!(output.meta.extra["fallback"], "ai");
        assert!(!output.items.is_empty());
    }
}
