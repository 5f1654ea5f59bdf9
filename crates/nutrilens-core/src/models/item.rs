// ABOUTME: Food item model shared by providers, the aggregator, slots, and responses
// ABOUTME: Pending items are unconfirmed suggestions that force response confidence to zero
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::nutrition::Totals;

/// A single food within an analyzed meal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzedItem {
    /// Food code from the per-gram table (e.g. `rice_cooked`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Display or raw ingredient name
    #[serde(default)]
    pub name: String,
    /// Edible weight in grams, `None` when unresolved
    #[serde(
        default,
        alias = "qty_g",
        alias = "quantity_g",
        skip_serializing_if = "Option::is_none"
    )]
    pub grams: Option<f64>,
    /// Quantity or identity is an unconfirmed suggestion
    #[serde(default)]
    pub pending: bool,
    /// Per-item confidence in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Where the coefficients came from (`code:rice_cooked`, `category:ごはん`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Coefficients per 100 g used for aggregation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per100: Option<Totals>,
}

impl AnalyzedItem {
    /// Item identified by food code, name defaulting to the code
    pub fn from_code(code: impl Into<String>, grams: f64) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code: Some(code),
            grams: Some(grams),
            ..Self::default()
        }
    }

    /// Item identified only by a free-text name
    pub fn from_name(name: impl Into<String>, grams: Option<f64>) -> Self {
        Self {
            name: name.into(),
            grams,
            ..Self::default()
        }
    }

    /// Mark as an unconfirmed suggestion
    #[must_use]
    pub const fn into_pending(mut self) -> Self {
        self.pending = true;
        self
    }

    /// Grams when strictly positive and finite
    #[must_use]
    pub fn usable_grams(&self) -> Option<f64> {
        self.grams.filter(|g| g.is_finite() && *g > 0.0)
    }

    /// Best label for table lookups: name, falling back to code
    #[must_use]
    pub fn lookup_label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.code.as_deref().unwrap_or_default()
        } else {
            &self.name
        }
    }

    /// True when the code starts with the given prefix
    #[must_use]
    pub fn code_starts_with(&self, prefix: &str) -> bool {
        self.code.as_deref().is_some_and(|c| c.starts_with(prefix))
    }
}
