// ABOUTME: Minimum-calorie floor for meals the estimator under-counted
// ABOUTME: Low-calorie drinks on a configurable allowlist are exempt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use nutrilens_core::constants::guardrails::{
    BASE_LOW_CAL_PATTERN, FLOOR_FAT_SHARE, FLOOR_PROTEIN_SHARE, WARN_ZERO_FLOORED,
};
use nutrilens_core::constants::policy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use nutrilens_core::errors::GuardrailError;
use nutrilens_core::models::{CanonicalPayload, Totals};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::GuardrailOptions;

const META_ZERO_FLOORED: &str = "zeroFloored";
const META_APPLIED_AT: &str = "zeroFloorAppliedAt";

/// Case-insensitive allowlist of foods that may legitimately be near zero kcal
#[derive(Debug, Clone)]
pub struct LowCalorieMatcher {
    pattern: Regex,
}

impl LowCalorieMatcher {
    /// Compile the base allowlist, optionally extended by an alternation
    ///
    /// # Errors
    ///
    /// Returns `GuardrailError::InvalidPattern` when the extension does not compile
    pub fn new(extra: Option<&str>) -> Result<Self, GuardrailError> {
        let source = match extra.map(str::trim).filter(|e| !e.is_empty()) {
            Some(extra) => format!("(?i){BASE_LOW_CAL_PATTERN}|(?:{extra})"),
            None => format!("(?i){BASE_LOW_CAL_PATTERN}"),
        };
        let pattern = Regex::new(&source).map_err(|e| GuardrailError::InvalidPattern {
            pattern: extra.unwrap_or_default().to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// True when the input text or dish names an allowlisted item
    #[must_use]
    pub fn allows(&self, input_text: Option<&str>, dish: Option<&str>) -> bool {
        let text = [input_text, dish]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        !text.is_empty() && self.pattern.is_match(&text)
    }
}

/// Scale macros so they carry `total_kcal`, or split 30/35/35 when empty
fn distribute_macros(total_kcal: f64, existing: Totals) -> Totals {
    let macro_kcal = existing.atwater();
    if macro_kcal > 0.0 {
        return Totals {
            kcal: total_kcal,
            ..existing.with_scaled_macros(total_kcal / macro_kcal)
        };
    }

    let protein_kcal = total_kcal * FLOOR_PROTEIN_SHARE;
    let fat_kcal = total_kcal * FLOOR_FAT_SHARE;
    let carbs_kcal = total_kcal - protein_kcal - fat_kcal;
    Totals::new(
        total_kcal,
        protein_kcal / KCAL_PER_G_PROTEIN,
        fat_kcal / KCAL_PER_G_FAT,
        carbs_kcal / KCAL_PER_G_CARBS,
    )
}

/// Lift kcal at or below `min_kcal` to the floor, redistributing macros
///
/// Runs at most once per payload: a payload whose meta already carries
/// `zeroFloored` passes through untouched.
#[must_use]
pub fn zero_floor(
    mut payload: CanonicalPayload,
    input_text: Option<&str>,
    options: &GuardrailOptions,
    low_cal: &LowCalorieMatcher,
) -> CanonicalPayload {
    if payload.meta_flag(META_ZERO_FLOORED) {
        return payload;
    }

    if low_cal.allows(input_text, payload.dish.as_deref()) {
        payload.totals = Totals {
            kcal: payload.totals.kcal.max(0.0),
            ..payload.totals
        }
        .rounded_tenths();
        return payload;
    }

    if payload.totals.kcal > options.min_kcal {
        return payload;
    }

    let floored = payload.totals.kcal.max(options.min_kcal).min(options.max_kcal);
    debug!(from = payload.totals.kcal, to = floored, "Applying zero-floor");
    payload.totals = distribute_macros(floored, payload.totals).rounded_tenths();
    payload.warnings.insert(WARN_ZERO_FLOORED);
    payload
        .meta
        .insert(META_ZERO_FLOORED.to_owned(), Value::Bool(true));
    payload.meta.insert(
        META_APPLIED_AT.to_owned(),
        Value::String(Utc::now().to_rfc3339()),
    );
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> LowCalorieMatcher {
        LowCalorieMatcher::new(None).unwrap()
    }

    #[test]
    fn test_allowlist_is_case_insensitive() {
        let low_cal = matcher();
        assert!(low_cal.allows(Some("Black Coffee"), None));
        assert!(low_cal.allows(None, Some("麦茶")));
        assert!(!low_cal.allows(Some("カツ丼"), None));
        assert!(!low_cal.allows(None, None));
    }

    #[test]
    fn test_empty_macros_split_by_calorie_share() {
        let payload = CanonicalPayload {
            dish: Some("サラダ".to_owned()),
            ..CanonicalPayload::default()
        };
        let out = zero_floor(payload, None, &GuardrailOptions::default(), &matcher());

        assert!((out.totals.kcal - 120.0).abs() < f64::EPSILON);
        assert!((out.totals.protein_g - 9.0).abs() < 0.05);
        assert!(out.meta.contains_key(META_APPLIED_AT));
        assert!(out.meta_flag(META_ZERO_FLOORED));
    }

    #[test]
    fn test_invalid_extension_is_rejected() {
        assert!(matches!(
            LowCalorieMatcher::new(Some("(")),
            Err(GuardrailError::InvalidPattern { .. })
        ));
    }
}
