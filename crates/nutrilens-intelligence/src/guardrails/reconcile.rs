// ABOUTME: Atwater reconciliation rescaling macros toward the declared kcal
// ABOUTME: kcal is authoritative and never modified; the report lands in meta.atwater
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::constants::guardrails::WARN_RECONCILED;
use nutrilens_core::models::CanonicalPayload;
use serde_json::json;
use tracing::debug;

/// Rescale macros when `|kcal - atwater| / max(atwater, 1)` exceeds `tolerance`
#[must_use]
pub fn reconcile(mut payload: CanonicalPayload, tolerance: f64) -> CanonicalPayload {
    let totals = payload.totals;
    let atwater = totals.atwater();

    if !atwater.is_finite() || atwater <= 0.0 {
        payload.totals = totals.rounded_tenths();
        payload
            .meta
            .insert("atwater".to_owned(), json!({ "value": atwater, "delta": totals.kcal }));
        return payload;
    }

    let delta = totals.kcal - atwater;
    let ratio = delta.abs() / atwater.max(1.0);

    let adjusted = if ratio > tolerance && totals.kcal > 0.0 {
        let scale = totals.kcal / atwater;
        debug!(ratio, scale, "Rescaling macros to declared kcal");
        payload.warnings.insert(WARN_RECONCILED);
        totals.with_scaled_macros(scale)
    } else {
        totals
    }
    .rounded_tenths();

    payload.totals = adjusted;
    payload.meta.insert(
        "atwater".to_owned(),
        json!({ "value": adjusted.atwater(), "delta": delta, "ratio": ratio }),
    );
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrilens_core::models::Totals;

    fn payload(totals: Totals) -> CanonicalPayload {
        CanonicalPayload {
            totals,
            ..CanonicalPayload::default()
        }
    }

    #[test]
    fn test_kcal_is_never_modified() {
        let out = reconcile(payload(Totals::new(800.0, 20.0, 10.0, 50.0)), 0.1);
        assert!((out.totals.kcal - 800.0).abs() < f64::EPSILON);
        assert!(out.warnings.contains(WARN_RECONCILED));
        let ratio = (out.totals.kcal - out.totals.atwater()).abs() / out.totals.atwater();
        assert!(ratio <= 0.1);
    }

    #[test]
    fn test_zero_macros_recorded_without_rescale() {
        let out = reconcile(payload(Totals::new(300.0, 0.0, 0.0, 0.0)), 0.1);
        assert!(!out.warnings.contains(WARN_RECONCILED));
        assert_eq!(out.meta["atwater"]["delta"], 300.0);
    }

    #[test]
    fn test_zero_kcal_is_not_rescaled() {
        let out = reconcile(payload(Totals::new(0.0, 10.0, 5.0, 20.0)), 0.1);
        assert!(!out.warnings.contains(WARN_RECONCILED));
        assert!((out.totals.protein_g - 10.0).abs() < f64::EPSILON);
    }
}
