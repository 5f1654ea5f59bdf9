// ABOUTME: Analysis response contract returned by the orchestrator
// ABOUTME: Nutrition facts, Atwater report, optional range, breakdown, and provenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::item::AnalyzedItem;
use super::meta::Meta;
use super::nutrition::{Totals, WarningSet};
use super::slot::Slots;

/// Response-facing nutrition block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    /// Energy in kilocalories
    pub calories: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
}

impl From<Totals> for NutritionFacts {
    fn from(t: Totals) -> Self {
        Self {
            calories: t.kcal,
            protein_g: t.protein_g,
            fat_g: t.fat_g,
            carbs_g: t.carbs_g,
        }
    }
}

impl From<NutritionFacts> for Totals {
    fn from(n: NutritionFacts) -> Self {
        Self::new(n.calories, n.protein_g, n.fat_g, n.carbs_g)
    }
}

/// Energy conservation report; informational, never a correction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AtwaterCheck {
    /// `(kcal − atwater) / max(1, kcal)`
    pub delta: f64,
    /// `|delta|` within tolerance
    pub pass: bool,
}

/// Inclusive `[min, max]` band for dishes with absorption uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionRange {
    /// kcal band
    pub kcal: [f64; 2],
    /// Protein band
    pub protein_g: [f64; 2],
    /// Fat band
    pub fat_g: [f64; 2],
    /// Carbohydrate band
    pub carbs_g: [f64; 2],
}

/// Item-level detail of a result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakdown {
    /// Final resolved items
    pub items: Vec<AnalyzedItem>,
    /// Refinement choices over `items`
    pub slots: Slots,
    /// Data-quality warnings
    pub warnings: WarningSet,
}

/// Complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Dish name
    pub dish: String,
    /// Overall confidence in `[0, 1]`; zero whenever an item is pending
    pub confidence: f64,
    /// Finalized nutrition
    pub nutrition: NutritionFacts,
    /// Conservation report
    pub atwater: AtwaterCheck,
    /// Uncertainty band, present for deep-fried dishes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NutritionRange>,
    /// Items, slots, and warnings
    pub breakdown: Breakdown,
    /// Provenance
    pub meta: Meta,
}

impl AnalysisResult {
    /// True when at least one item exists and every item is pending
    #[must_use]
    pub fn all_items_pending(&self) -> bool {
        !self.breakdown.items.is_empty() && self.breakdown.items.iter().all(|i| i.pending)
    }
}
