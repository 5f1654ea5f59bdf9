// ABOUTME: Sums item-level coefficients into finalized totals with an optional oil band
// ABOUTME: Unidentifiable, weightless, and unknown items are marked pending and excluded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Item Aggregator
//!
//! Each usable item contributes `grams / 100 × per100`. Deep-fried dishes get
//! absorbed frying oil added as pure fat at three absorption rates, and the
//! policy turns the resulting min/mid/max sums into a range.

use std::sync::LazyLock;

use nutrilens_core::constants::policy::OIL_KCAL_PER_100G;
use nutrilens_core::models::{AnalyzedItem, AtwaterCheck, NutritionRange, Totals, WarningSet};
use regex::Regex;
use tracing::debug;

use crate::food_table;
use crate::policy::ConservationPolicy;

static DEEP_FRIED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)揚|フライ|唐揚|天ぷら|カツ|とんかつ|katsu|fried|cutlet").ok()
});

/// Bonito is spelled with the cutlet katakana but is never fried
const NOT_FRIED: &[&str] = &["カツオ"];

/// True when the dish name implies deep frying
#[must_use]
pub fn is_deep_fried(dish: &str) -> bool {
    let scrubbed = NOT_FRIED
        .iter()
        .fold(dish.to_owned(), |acc, term| acc.replace(term, ""));
    DEEP_FRIED
        .as_ref()
        .is_some_and(|re| re.is_match(&scrubbed))
}

/// Aggregated result for an item list
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Finalized totals
    pub totals: Totals,
    /// Conservation report
    pub atwater: AtwaterCheck,
    /// Oil absorption band for deep-fried dishes
    pub range: Option<NutritionRange>,
    /// Data-quality warnings such as `unknown_food:<name>`
    pub warnings: WarningSet,
    /// Items annotated with `source` and `per100`, or marked pending
    pub items: Vec<AnalyzedItem>,
}

impl Aggregation {
    /// Whether any usable item contributed energy
    #[must_use]
    pub fn has_energy(&self) -> bool {
        self.totals.kcal > 0.0
    }
}

/// Aggregator parameterized by a conservation policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    policy: ConservationPolicy,
}

impl Aggregator {
    /// Aggregator using the given policy
    #[must_use]
    pub const fn new(policy: ConservationPolicy) -> Self {
        Self { policy }
    }

    /// Sum items into finalized totals for `dish`
    #[must_use]
    pub fn compute(&self, items: &[AnalyzedItem], dish: &str) -> Aggregation {
        let mut mid = Totals::ZERO;
        let mut finished_grams = 0.0;
        let mut warnings = WarningSet::new();
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            let label = item.lookup_label().trim().to_owned();
            let Some(grams) = item.usable_grams().filter(|_| !label.is_empty()) else {
                resolved.push(item.clone().into_pending());
                continue;
            };
            // Finished weight includes items without coefficients
            finished_grams += grams;

            match food_table::lookup(item.code.as_deref(), &label) {
                Some(hit) => {
                    debug!(label = %label, grams, source = %hit.source, "Item resolved");
                    mid.add_portion(&hit.per100, grams);
                    resolved.push(AnalyzedItem {
                        source: Some(hit.source),
                        per100: Some(hit.per100),
                        ..item.clone()
                    });
                }
                None => {
                    debug!(label = %label, grams, "Item not found in food tables");
                    warnings.insert(format!("unknown_food:{label}"));
                    resolved.push(item.clone().into_pending());
                }
            }
        }

        let finalized = if is_deep_fried(dish) {
            let oil = self.policy.oil;
            let min = with_oil(mid, finished_grams, oil.min);
            let max = with_oil(mid, finished_grams, oil.max);
            let mid = with_oil(mid, finished_grams, oil.mid);
            self.policy.finalize(mid, Some(min), Some(max))
        } else {
            self.policy.finalize(mid, None, None)
        };

        Aggregation {
            totals: finalized.total,
            atwater: finalized.atwater,
            range: finalized.range,
            warnings,
            items: resolved,
        }
    }
}

/// Add `round(finished_grams × factor)` grams of frying oil as pure fat
fn with_oil(sum: Totals, finished_grams: f64, factor: f64) -> Totals {
    let oil_grams = (finished_grams * factor).round().max(0.0);
    let mut out = sum;
    out.add_portion(&Totals::new(OIL_KCAL_PER_100G, 0.0, 100.0, 0.0), oil_grams);
    out
}

/// Aggregate with the default policy
#[must_use]
pub fn compute_from_items(items: &[AnalyzedItem], dish: &str) -> Aggregation {
    Aggregator::default().compute(items, dish)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_fried_detection() {
        assert!(is_deep_fried("とんかつ定食"));
        assert!(is_deep_fried("エビフライ"));
        assert!(is_deep_fried("Fried chicken"));
        assert!(!is_deep_fried("カツオのたたき"));
        assert!(!is_deep_fried("焼き魚定食"));
    }

    #[test]
    fn test_oil_band_counts_unresolved_weight() {
        let known = vec![AnalyzedItem::from_code("pork_loin_cutlet", 100.0)];
        let mut with_unknown = known.clone();
        with_unknown.push(AnalyzedItem::from_name("謎の食材", Some(100.0)));

        let base = compute_from_items(&known, "とんかつ定食");
        let wider = compute_from_items(&with_unknown, "とんかつ定食");

        assert!(wider.warnings.contains("unknown_food:謎の食材"));
        assert!(wider.totals.kcal > base.totals.kcal);
        assert!(wider.totals.fat_g > base.totals.fat_g);
        assert!((wider.totals.protein_g - base.totals.protein_g).abs() < 1e-9);
    }

    #[test]
    fn test_weightless_items_add_no_oil() {
        let known = vec![AnalyzedItem::from_code("pork_loin_cutlet", 100.0)];
        let mut with_pending = known.clone();
        with_pending.push(AnalyzedItem::from_name("キャベツ", None));

        let base = compute_from_items(&known, "とんかつ定食");
        let same = compute_from_items(&with_pending, "とんかつ定食");

        assert_eq!(base.totals, same.totals);
        assert!(same.items[1].pending);
    }
}
