// ABOUTME: Energy and macro-nutrient totals with the Atwater conversion
// ABOUTME: Also defines WarningSet, the ordered de-duplicated warning collection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::policy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// Atwater general factor system: `4·protein + 9·fat + 4·carbs`
///
/// Reference: Merrill & Watt, "Energy Value of Foods" (USDA Handbook 74, 1973).
#[must_use]
pub fn atwater_kcal(protein_g: f64, fat_g: f64, carbs_g: f64) -> f64 {
    KCAL_PER_G_FAT.mul_add(
        fat_g,
        KCAL_PER_G_PROTEIN.mul_add(protein_g, KCAL_PER_G_CARBS * carbs_g),
    )
}

/// Energy and macro totals; all values are non-negative once sanitized
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Energy in kilocalories
    pub kcal: f64,
    /// Protein in grams
    pub protein_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
}

impl Totals {
    /// All-zero totals
    pub const ZERO: Self = Self {
        kcal: 0.0,
        protein_g: 0.0,
        fat_g: 0.0,
        carbs_g: 0.0,
    };

    /// Create totals from kcal and the macro triple
    #[must_use]
    pub const fn new(kcal: f64, protein_g: f64, fat_g: f64, carbs_g: f64) -> Self {
        Self {
            kcal,
            protein_g,
            fat_g,
            carbs_g,
        }
    }

    /// Energy implied by the macros alone
    #[must_use]
    pub fn atwater(&self) -> f64 {
        atwater_kcal(self.protein_g, self.fat_g, self.carbs_g)
    }

    /// True when calories or any macro is strictly positive
    #[must_use]
    pub fn has_any_positive(&self) -> bool {
        [self.kcal, self.protein_g, self.fat_g, self.carbs_g]
            .iter()
            .any(|v| *v > 0.0)
    }

    /// Multiply the macro triple, leaving kcal untouched
    #[must_use]
    pub fn with_scaled_macros(self, factor: f64) -> Self {
        Self {
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
            carbs_g: self.carbs_g * factor,
            ..self
        }
    }

    /// Add `grams` of a food described per 100 g
    pub fn add_portion(&mut self, per100: &Self, grams: f64) {
        let factor = grams / 100.0;
        self.kcal += per100.kcal * factor;
        self.protein_g += per100.protein_g * factor;
        self.fat_g += per100.fat_g * factor;
        self.carbs_g += per100.carbs_g * factor;
    }

    /// Round every field to one decimal (guardrail granularity)
    #[must_use]
    pub fn rounded_tenths(self) -> Self {
        Self {
            kcal: round_tenths(self.kcal),
            protein_g: round_tenths(self.protein_g),
            fat_g: round_tenths(self.fat_g),
            carbs_g: round_tenths(self.carbs_g),
        }
    }
}

/// Round half away from zero to one decimal
#[must_use]
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Insertion-ordered set of warning tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarningSet(Vec<String>);

impl WarningSet {
    /// Create an empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a tag unless it is empty or already present
    pub fn insert(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !warning.is_empty() && !self.0.contains(&warning) {
            self.0.push(warning);
        }
    }

    /// Insert every tag from an iterator
    pub fn extend<I, S>(&mut self, warnings: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for warning in warnings {
            self.insert(warning);
        }
    }

    /// Whether the tag is present
    #[must_use]
    pub fn contains(&self, warning: &str) -> bool {
        self.0.iter().any(|w| w == warning)
    }

    /// Number of distinct tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tag has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Consume into the underlying vector
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for WarningSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atwater_factors() {
        assert!((atwater_kcal(10.0, 10.0, 10.0) - 170.0).abs() < f64::EPSILON);
        assert!((Totals::new(0.0, 1.0, 0.0, 0.0).atwater() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_warning_set_deduplicates_in_order() {
        let set: WarningSet = ["b", "a", "b", "", "c", "a"].into_iter().collect();
        assert_eq!(set.into_vec(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_add_portion_scales_per_100g() {
        let mut sum = Totals::ZERO;
        sum.add_portion(&Totals::new(168.0, 2.5, 0.3, 37.0), 200.0);
        assert!((sum.kcal - 336.0).abs() < 1e-9);
        assert!((sum.carbs_g - 74.0).abs() < 1e-9);
    }
}
