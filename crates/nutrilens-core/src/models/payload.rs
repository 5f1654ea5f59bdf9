// ABOUTME: Canonical guardrail payload produced by schema normalization
// ABOUTME: Guarded output mirrors legacy nutrition and breakdown blocks for persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::analysis::NutritionFacts;
use super::nutrition::{Totals, WarningSet};

/// Item after schema normalization; every numeric field is optional
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalItem {
    /// Ingredient name (falls back to code during parsing)
    pub name: Option<String>,
    /// Food code
    pub code: Option<String>,
    /// Evidence source
    pub source: Option<String>,
    /// Edible grams
    pub grams: Option<f64>,
    /// Item energy
    pub kcal: Option<f64>,
    /// Item protein
    pub protein_g: Option<f64>,
    /// Item fat
    pub fat_g: Option<f64>,
    /// Item carbohydrate
    pub carbs_g: Option<f64>,
    /// Item confidence
    pub confidence: Option<f64>,
    /// Free-form note
    pub note: Option<String>,
}

impl CanonicalItem {
    /// Has at least one of name, code, grams, or kcal
    #[must_use]
    pub fn is_identifiable(&self) -> bool {
        self.name.as_deref().is_some_and(|s| !s.is_empty())
            || self.code.as_deref().is_some_and(|s| !s.is_empty())
            || self.grams.is_some()
            || self.kcal.is_some()
    }
}

/// Canonical `{dish, totals, items, warnings, confidence, meta}` payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalPayload {
    /// Dish name
    pub dish: Option<String>,
    /// Totals
    pub totals: Totals,
    /// Items
    pub items: Vec<CanonicalItem>,
    /// Accumulated warnings
    pub warnings: WarningSet,
    /// Overall confidence
    pub confidence: Option<f64>,
    /// Open metadata map (stages add `atwater`, `zeroFloored`, ...)
    pub meta: Map<String, Value>,
}

impl CanonicalPayload {
    /// Read a boolean flag from `meta`
    #[must_use]
    pub fn meta_flag(&self, key: &str) -> bool {
        self.meta.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Legacy-compatible breakdown block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuardedBreakdown {
    /// Sanitized items
    pub items: Vec<CanonicalItem>,
    /// De-duplicated warnings
    pub warnings: WarningSet,
}

/// Output of a full guardrail run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardedPayload {
    /// Canonical fields after all four stages
    #[serde(flatten)]
    pub payload: CanonicalPayload,
    /// Legacy mirror of `payload.totals`
    pub nutrition: NutritionFacts,
    /// Legacy mirror of items and warnings
    pub breakdown: GuardedBreakdown,
}

impl GuardedPayload {
    /// Wrap a canonical payload, deriving the legacy mirrors
    #[must_use]
    pub fn from_payload(payload: CanonicalPayload) -> Self {
        let nutrition = NutritionFacts::from(payload.totals);
        let breakdown = GuardedBreakdown {
            items: payload.items.clone(),
            warnings: payload.warnings.clone(),
        };
        Self {
            payload,
            nutrition,
            breakdown,
        }
    }
}
