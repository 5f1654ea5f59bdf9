// ABOUTME: Nutrition provider abstraction and shared request/response types
// ABOUTME: Estimator, deterministic dictionary, resilient wrapper, and catalog-first providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Providers
//!
//! A provider turns an [`AnalyzeRequest`] into a [`ProviderOutput`]: a dish
//! name, optional direct totals, candidate items, warnings, and provenance.
//! Providers never aggregate or finalize; that is the orchestrator's job.
//!
//! - [`EstimatorProvider`]: the generative estimator plus payload adaptation
//! - [`DeterministicProvider`]: archetypes and keyword rules; never fails
//! - [`ResilientProvider`]: timeout, retry, breaker, and dictionary fallback around the estimator
//! - [`CatalogFirstProvider`]: catalog candidates first, then an inner provider

/// Catalog-first hybrid provider
pub mod catalog;
/// Deterministic dictionary provider
pub mod deterministic;
/// Estimator-backed provider
pub mod estimator;
/// Resilient wrapper with circuit breaker and fallback
pub mod resilient;

pub use catalog::{CatalogCandidate, CatalogFirstProvider};
pub use deterministic::DeterministicProvider;
pub use estimator::EstimatorProvider;
pub use resilient::{ResilienceConfig, ResilientProvider};

use async_trait::async_trait;
use nutrilens_core::constants::estimator::DEFAULT_LOCALE;
use nutrilens_core::errors::AppResult;
use nutrilens_core::models::{AnalyzedItem, Meta, Totals, WarningSet};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Caller input for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text meal description
    pub text: String,
    /// Locale of `text`
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Optional meal photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    /// MIME type of `image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    /// Food catalog matches supplied by the caller, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_candidates: Vec<CatalogCandidate>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_owned()
}

impl AnalyzeRequest {
    /// Text request in the default locale
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: default_locale(),
            image: None,
            mime: None,
            catalog_candidates: Vec::new(),
        }
    }

    /// Set the locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Attach a photo
    #[must_use]
    pub fn with_image(mut self, image: Vec<u8>, mime: Option<String>) -> Self {
        self.image = Some(image);
        self.mime = mime;
        self
    }

    /// Attach catalog candidates
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<CatalogCandidate>) -> Self {
        self.catalog_candidates = candidates;
        self
    }

    /// `hex(sha256("{locale}::{text}"))`, stable across retries and processes
    #[must_use]
    pub fn request_id(&self) -> String {
        let digest = Sha256::digest(format!("{}::{}", self.locale, self.text).as_bytes());
        hex::encode(digest)
    }
}

/// Unfinalized provider answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderOutput {
    /// Dish name, if the provider named one
    pub dish: Option<String>,
    /// Direct totals; `None` when the provider only listed items
    pub totals: Option<Totals>,
    /// Candidate items
    pub items: Vec<AnalyzedItem>,
    /// Data-quality and fallback warnings
    pub warnings: WarningSet,
    /// Provider confidence
    pub confidence: Option<f64>,
    /// Provenance and diagnostics
    pub meta: Meta,
}

impl ProviderOutput {
    /// Empty output for a dish
    #[must_use]
    pub fn empty(dish: Option<String>) -> Self {
        Self {
            dish,
            ..Self::default()
        }
    }

    /// Direct totals with at least one positive value
    #[must_use]
    pub fn direct_totals(&self) -> Option<Totals> {
        self.totals.filter(Totals::has_any_positive)
    }

    /// True when some item has strictly positive grams
    #[must_use]
    pub fn has_usable_items(&self) -> bool {
        self.items.iter().any(|item| item.usable_grams().is_some())
    }
}

/// Contract for nutrition providers
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// Provider identifier reported in `meta.provider`
    fn name(&self) -> &'static str;

    /// Produce candidate nutrition for a request
    ///
    /// # Errors
    ///
    /// Implementations return errors only for conditions they cannot degrade
    /// from; the resilient and deterministic providers never fail.
    async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<ProviderOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_locale_scoped() {
        let ja = AnalyzeRequest::new("牛丼");
        let en = AnalyzeRequest::new("牛丼").with_locale("en");
        assert_eq!(ja.request_id().len(), 64);
        assert_eq!(ja.request_id(), AnalyzeRequest::new("牛丼").request_id());
        assert_ne!(ja.request_id(), en.request_id());
    }

    #[test]
    fn test_direct_totals_require_positive_value() {
        let mut output = ProviderOutput::empty(None);
        output.totals = Some(Totals::ZERO);
        assert!(output.direct_totals().is_none());
        output.totals = Some(Totals::new(0.0, 3.0, 0.0, 0.0));
        assert!(output.direct_totals().is_some());
    }
}
