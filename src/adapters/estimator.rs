// ABOUTME: Normalizes raw estimator answers into provider output
// ABOUTME: Handles fenced or malformed JSON, totals in three locations, and qty/unit items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Estimator Adapter
//!
//! The estimator is asked for strict JSON but routinely wraps it in Markdown
//! fences, adds prose around it, or names fields differently. This module is
//! the only place that knows those variations.

use std::sync::LazyLock;

use nutrilens_core::models::{AnalyzedItem, Meta, Totals, WarningSet};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::meta::derive_meta_from_legacy;
use crate::llm::RawEstimate;
use crate::providers::ProviderOutput;

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").ok());

/// Units the estimator may report; anything else is read as grams
const KNOWN_UNITS: &[&str] = &["g", "ml", "piece"];

/// Field names holding item grams, in priority order
const GRAM_FIELDS: &[&str] = &["grams", "qty_g", "quantity_g", "g", "amount"];

/// Meta keys owned by the typed provenance fields
const RESERVED_META_KEYS: &[&str] = &[
    "source_kind",
    "fallback_level",
    "archetype_id",
    "guardrail_version",
];

/// Remove Markdown code fences and surrounding whitespace
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE
        .as_ref()
        .map_or_else(|| text.to_owned(), |re| re.replace_all(text, "").into_owned())
        .trim()
        .to_owned()
}

/// Parse estimator text, tolerating fences and prose around the object
fn parse_text(text: &str) -> Option<Value> {
    let stripped = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
        return Some(value);
    }
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&stripped[start..=end]).ok()
}

/// Finite number from a JSON number or numeric string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| object.get(*key).and_then(number))
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Totals block with the given energy field names
fn totals_from(object: &Map<String, Value>, kcal_keys: &[&str]) -> Option<Totals> {
    let kcal = first_number(object, kcal_keys);
    let protein = first_number(object, &["protein_g", "protein"]);
    let fat = first_number(object, &["fat_g", "fat"]);
    let carbs = first_number(object, &["carbs_g", "carbs"]);
    if kcal.is_none() && protein.is_none() && fat.is_none() && carbs.is_none() {
        return None;
    }
    Some(Totals::new(
        kcal.unwrap_or(0.0),
        protein.unwrap_or(0.0),
        fat.unwrap_or(0.0),
        carbs.unwrap_or(0.0),
    ))
}

/// Totals from `totals`, then `nutrition`, then root-level fields
fn extract_totals(root: &Map<String, Value>) -> Option<Totals> {
    root.get("totals")
        .and_then(Value::as_object)
        .and_then(|t| totals_from(t, &["kcal", "calories"]))
        .or_else(|| {
            root.get("nutrition")
                .and_then(Value::as_object)
                .and_then(|n| totals_from(n, &["calories", "kcal"]))
        })
        .or_else(|| totals_from(root, &["calories", "kcal"]))
}

fn normalize_unit(unit: Option<&str>) -> &'static str {
    let unit = unit.map(str::trim).unwrap_or_default().to_lowercase();
    KNOWN_UNITS
        .iter()
        .find(|known| **known == unit)
        .copied()
        .unwrap_or("g")
}

/// One estimator item; `None` for non-object entries
fn to_item(value: &Value) -> Option<AnalyzedItem> {
    let object = value.as_object()?;
    let code = non_empty_str(object, "code").map(str::to_owned);
    let name = non_empty_str(object, "name")
        .map(str::to_owned)
        .or_else(|| code.clone())
        .unwrap_or_default();

    let grams = first_number(object, GRAM_FIELDS).or_else(|| {
        let unit = normalize_unit(object.get("unit").and_then(Value::as_str));
        if unit == "g" {
            object.get("qty").and_then(number)
        } else {
            None
        }
    });

    Some(AnalyzedItem {
        code,
        name,
        grams,
        pending: object.get("pending").and_then(Value::as_bool).unwrap_or(false),
        confidence: object
            .get("confidence")
            .and_then(number)
            .map(|c| c.clamp(0.0, 1.0)),
        source: None,
        per100: None,
    })
}

/// Provenance derived from legacy markers, extended with the raw meta map
fn extract_meta(root: &Map<String, Value>) -> Meta {
    let raw_meta = root.get("meta").and_then(Value::as_object);
    let lookup = |key: &str| {
        non_empty_str(root, key).or_else(|| raw_meta.and_then(|m| non_empty_str(m, key)))
    };

    let mut meta = derive_meta_from_legacy(lookup("landing_type"), lookup("archetype_id"));
    if let Some(raw_meta) = raw_meta {
        for (key, value) in raw_meta {
            if !RESERVED_META_KEYS.contains(&key.as_str()) {
                meta.extra.insert(key.clone(), value.clone());
            }
        }
    }
    meta
}

/// Adapt a raw estimator answer into provider output
///
/// Unparseable answers yield an empty output named after `fallback_dish`, so
/// the orchestrator's deterministic substitution takes over.
#[must_use]
pub fn to_provider_payload(raw: &RawEstimate, fallback_dish: Option<&str>) -> ProviderOutput {
    let fallback_dish = fallback_dish
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned);

    let parsed = match raw {
        RawEstimate::Json(value) => Some(value.clone()),
        RawEstimate::Text(text) => parse_text(text),
    };
    let Some(Value::Object(root)) = parsed else {
        warn!("Estimator answer is not a JSON object");
        return ProviderOutput::empty(fallback_dish);
    };

    let items = root
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(to_item).collect())
        .unwrap_or_default();

    let warnings: WarningSet = root
        .get("warnings")
        .and_then(Value::as_array)
        .map(|w| w.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    ProviderOutput {
        dish: non_empty_str(&root, "dish")
            .map(str::to_owned)
            .or(fallback_dish),
        totals: extract_totals(&root),
        items,
        warnings,
        confidence: first_number(&root, &["confidence", "score"]).map(|c| c.clamp(0.0, 1.0)),
        meta: extract_meta(&root),
    }
}
