// ABOUTME: Clamps totals and item fields to physically meaningful ranges
// ABOUTME: Non-finite numbers become zero and unidentifiable items are dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::models::{CanonicalItem, CanonicalPayload, Totals};

fn clamp_number(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn sanitize_totals(totals: Totals, max_kcal: f64) -> Totals {
    Totals::new(
        clamp_number(totals.kcal, 0.0, max_kcal),
        clamp_number(totals.protein_g, 0.0, f64::INFINITY),
        clamp_number(totals.fat_g, 0.0, f64::INFINITY),
        clamp_number(totals.carbs_g, 0.0, f64::INFINITY),
    )
    .rounded_tenths()
}

fn sanitize_item(item: CanonicalItem) -> CanonicalItem {
    CanonicalItem {
        grams: positive(item.grams),
        kcal: positive(item.kcal),
        protein_g: positive(item.protein_g),
        fat_g: positive(item.fat_g),
        carbs_g: positive(item.carbs_g),
        confidence: item
            .confidence
            .filter(|c| c.is_finite() && *c >= 0.0)
            .map(|c| c.min(1.0)),
        ..item
    }
}

/// Clamp and round a parsed payload
///
/// kcal is clamped to `[0, max_kcal]` and macros to `>= 0`; totals are rounded
/// to 0.1. Item numbers survive only when finite and positive. Warnings are
/// already de-duplicated by `WarningSet`.
#[must_use]
pub fn sanitize(payload: CanonicalPayload, max_kcal: f64) -> CanonicalPayload {
    let items = payload
        .items
        .into_iter()
        .map(sanitize_item)
        .filter(CanonicalItem::is_identifiable)
        .collect();

    CanonicalPayload {
        totals: sanitize_totals(payload.totals, max_kcal),
        items,
        confidence: payload
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0)),
        ..payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_clamped_and_rounded() {
        let payload = CanonicalPayload {
            totals: Totals::new(5000.0, -3.0, f64::NAN, 41.26),
            ..CanonicalPayload::default()
        };
        let clean = sanitize(payload, 2000.0);
        assert_eq!(clean.totals, Totals::new(2000.0, 0.0, 0.0, 41.3));
    }

    #[test]
    fn test_items_filtered_and_confidence_clamped() {
        let payload = CanonicalPayload {
            items: vec![
                CanonicalItem {
                    name: Some("ごはん".to_owned()),
                    grams: Some(-10.0),
                    confidence: Some(1.7),
                    ..CanonicalItem::default()
                },
                CanonicalItem {
                    grams: Some(f64::INFINITY),
                    confidence: Some(-0.2),
                    ..CanonicalItem::default()
                },
            ],
            confidence: Some(3.0),
            ..CanonicalPayload::default()
        };
        let clean = sanitize(payload, 2000.0);

        assert_eq!(clean.items.len(), 1);
        assert_eq!(clean.items[0].grams, None);
        assert_eq!(clean.items[0].confidence, Some(1.0));
        assert_eq!(clean.confidence, Some(1.0));
    }
}
