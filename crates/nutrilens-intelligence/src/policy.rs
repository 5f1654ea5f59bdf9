// ABOUTME: Rounding rules and the Atwater energy conservation check
// ABOUTME: Totals are rounded exactly once here; the check reports and never corrects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conservation Policy
//!
//! `finalize_totals` is the single point where aggregated sums become
//! response numbers. Macros are rounded to one decimal, kcal to an integer,
//! and the Atwater delta is computed on the rounded values:
//!
//! ```text
//! delta = (kcal - (4P + 9F + 4C)) / max(1, kcal)
//! pass  = |delta| <= tolerance
//! ```

use nutrilens_core::constants::policy::{
    ATWATER_TOLERANCE, MACRO_DIGITS, OIL_ABSORPTION_MAX, OIL_ABSORPTION_MID, OIL_ABSORPTION_MIN,
};
use nutrilens_core::models::{AtwaterCheck, NutritionRange, Totals};
use serde::{Deserialize, Serialize};

/// Round a macro value to the policy precision (one decimal)
#[must_use]
pub fn round_macro(value: f64) -> f64 {
    let scale = 10_f64.powi(MACRO_DIGITS);
    (value * scale).round() / scale
}

/// Round kcal to an integer
#[must_use]
pub fn round_kcal(value: f64) -> f64 {
    value.round()
}

/// Relative gap between declared kcal and the Atwater energy of the macros
#[must_use]
pub fn conservation_delta(totals: &Totals) -> f64 {
    (totals.kcal - totals.atwater()) / totals.kcal.max(1.0)
}

/// Fraction of finished weight absorbed as frying oil
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OilAbsorption {
    /// Lower bound of the band
    pub min: f64,
    /// Point estimate
    pub mid: f64,
    /// Upper bound of the band
    pub max: f64,
}

impl Default for OilAbsorption {
    fn default() -> Self {
        Self {
            min: OIL_ABSORPTION_MIN,
            mid: OIL_ABSORPTION_MID,
            max: OIL_ABSORPTION_MAX,
        }
    }
}

/// Tunable conservation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConservationPolicy {
    /// Maximum `|delta|` that still passes
    pub atwater_tolerance: f64,
    /// Oil absorption band for deep-fried dishes
    pub oil: OilAbsorption,
}

impl Default for ConservationPolicy {
    fn default() -> Self {
        Self {
            atwater_tolerance: ATWATER_TOLERANCE,
            oil: OilAbsorption::default(),
        }
    }
}

/// Rounded totals with the conservation report and optional band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finalized {
    /// Rounded point estimate
    pub total: Totals,
    /// Conservation report on the rounded values
    pub atwater: AtwaterCheck,
    /// Band when both bounds were supplied
    pub range: Option<NutritionRange>,
}

impl ConservationPolicy {
    /// Round once, check conservation, and build the band when both bounds exist
    #[must_use]
    pub fn finalize(&self, mid: Totals, min: Option<Totals>, max: Option<Totals>) -> Finalized {
        let total = Self::round_totals(mid);
        let delta = conservation_delta(&total);

        let range = match (min, max) {
            (Some(low), Some(high)) => {
                let low = Self::round_totals(low);
                let high = Self::round_totals(high);
                Some(NutritionRange {
                    kcal: [low.kcal, high.kcal],
                    protein_g: [low.protein_g, high.protein_g],
                    fat_g: [low.fat_g, high.fat_g],
                    carbs_g: [low.carbs_g, high.carbs_g],
                })
            }
            _ => None,
        };

        Finalized {
            total,
            atwater: AtwaterCheck {
                delta,
                pass: delta.abs() <= self.atwater_tolerance,
            },
            range,
        }
    }

    fn round_totals(totals: Totals) -> Totals {
        Totals::new(
            round_kcal(totals.kcal),
            round_macro(totals.protein_g),
            round_macro(totals.fat_g),
            round_macro(totals.carbs_g),
        )
    }
}

/// Finalize with the default policy
#[must_use]
pub fn finalize_totals(mid: Totals, min: Option<Totals>, max: Option<Totals>) -> Finalized {
    ConservationPolicy::default().finalize(mid, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert!((round_macro(23.47) - 23.5).abs() < 1e-9);
        assert!((round_macro(22.64) - 22.6).abs() < 1e-9);
        assert!((round_kcal(379.8) - 380.0).abs() < 1e-9);
    }

    #[test]
    fn test_conservation_delta_guards_small_kcal() {
        let delta = conservation_delta(&Totals::new(0.0, 1.0, 0.0, 0.0));
        assert!((delta + 4.0).abs() < 1e-9);
    }
}
