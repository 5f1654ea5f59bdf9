// ABOUTME: Maps the shadow result DTO onto the legacy DTO persisted by existing consumers
// ABOUTME: Derives stable base64url item identifiers from item content and a per-record seed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Shadow to Legacy DTO Adapter
//!
//! The mapping is lossless except for item identifiers, which are generated
//! when missing. Identifiers are a UUIDv4-shaped digest of the item so that
//! the same record always yields the same ids.

use std::sync::LazyLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use nutrilens_core::constants::adapter::{
    ADAPTER_SOURCE, ADAPTER_VERSION, DEFAULT_DISH, DEFAULT_EVENT, DEFAULT_SLOT,
};
use nutrilens_core::constants::estimator::DEFAULT_CONFIDENCE;
use nutrilens_core::errors::AdapterError;
use nutrilens_core::models::{AtwaterCheck, NutritionFacts, Totals};
use nutrilens_intelligence::finalize_totals;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

static ITEM_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{22}$").ok());

/// Field names holding item grams, in priority order
const GRAM_FIELDS: &[&str] = &["grams", "qty_g", "quantity_g", "g", "amount"];

/// Meta keys consulted for the identifier seed, in priority order
const SEED_KEYS: &[&str] = &["idempotency_key_hash", "hash", "normalized_hash"];

/// Legacy item with a guaranteed identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyItem {
    /// Stable 22-character base64url identifier
    pub item_id: String,
    /// Food code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    /// Display name (`name`, `ingredient`, or `code`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Grams, zero when unknown
    pub grams: f64,
    /// Grams as entered by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams_input: Option<Value>,
    /// Portion multiplier applied by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_factor: Option<Value>,
    /// Unconfirmed suggestion
    pub pending: bool,
    /// Coefficient source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Value>,
    /// Per-100 g coefficients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per100: Option<Value>,
    /// Item-level metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Legacy breakdown block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyBreakdown {
    /// Normalized items
    pub items: Vec<LegacyItem>,
    /// Warnings, copied verbatim
    pub warnings: Vec<Value>,
    /// Slots, kept only when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Map<String, Value>>,
}

/// Legacy result DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyDto {
    /// Dish name
    pub dish: String,
    /// Overall confidence
    pub confidence: f64,
    /// Nutrition as supplied, zero-filled
    pub nutrition: NutritionFacts,
    /// Conservation report over the rounded nutrition
    pub atwater: AtwaterCheck,
    /// Items, warnings, and slots
    pub breakdown: LegacyBreakdown,
    /// Metadata with coverage, slot, event, and adapter stamp
    pub meta: Map<String, Value>,
    /// Coverage block, `null` when absent
    pub coverage: Option<Value>,
}

/// Content hashed into an item id; field order is part of the id contract
#[derive(Serialize)]
struct IdSeed<'a> {
    index: usize,
    seed: &'a str,
    code: &'a Value,
    name: &'a Value,
    grams: &'a Value,
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numeric reading where absent, null, and empty strings are `None`
fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

/// Truthy scalar rendered as text
fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// First value among `keys` that is present and not null
fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> &'a Value {
    keys.iter()
        .find_map(|key| object.get(*key).filter(|v| !v.is_null()))
        .unwrap_or(&Value::Null)
}

fn present(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|v| !v.is_null()).cloned()
}

/// Stable identifier for the item at `index`
///
/// A well-formed existing `item_id` is kept. Otherwise the first 16 bytes of
/// a SHA-256 over the item content get the UUIDv4 version and variant bits and
/// are encoded as unpadded base64url.
#[must_use]
pub fn stable_item_id(item: &Map<String, Value>, index: usize, seed: &str) -> String {
    if let Some(existing) = item.get("item_id").and_then(Value::as_str) {
        if ITEM_ID.as_ref().is_some_and(|re| re.is_match(existing)) {
            return existing.to_owned();
        }
    }

    let content = IdSeed {
        index,
        seed,
        code: first_present(item, &["code"]),
        name: first_present(item, &["name", "ingredient"]),
        grams: first_present(item, &GRAM_FIELDS[..4]),
    };
    let encoded = serde_json::to_vec(&content).unwrap_or_default();
    let digest = Sha256::digest(&encoded);

    let mut bytes = [0_u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Grams from the first field that reads as a finite number; null counts as zero
fn item_grams(item: &Map<String, Value>) -> f64 {
    GRAM_FIELDS
        .iter()
        .find_map(|key| match item.get(*key)? {
            Value::Null => Some(0.0),
            Value::String(s) if s.trim().is_empty() => Some(0.0),
            other => to_number(Some(other)),
        })
        .unwrap_or(0.0)
}

fn normalize_item(value: &Value, index: usize, seed: &str) -> LegacyItem {
    let empty = Map::new();
    let Some(item) = value.as_object() else {
        return LegacyItem {
            item_id: stable_item_id(&empty, index, seed),
            code: None,
            name: None,
            grams: 0.0,
            grams_input: None,
            portion_factor: None,
            pending: true,
            source: None,
            note: None,
            per100: None,
            meta: None,
        };
    };

    LegacyItem {
        item_id: stable_item_id(item, index, seed),
        code: present(item, "code"),
        name: present(item, "name")
            .or_else(|| present(item, "ingredient"))
            .or_else(|| present(item, "code")),
        grams: item_grams(item),
        grams_input: present(item, "grams_input"),
        portion_factor: present(item, "portion_factor"),
        pending: item.get("pending").is_some_and(is_truthy),
        source: present(item, "source"),
        note: present(item, "note"),
        per100: present(item, "per100"),
        meta: present(item, "meta"),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn normalize_breakdown(breakdown: Option<&Map<String, Value>>, seed: &str) -> LegacyBreakdown {
    let Some(breakdown) = breakdown else {
        return LegacyBreakdown::default();
    };
    let items = breakdown
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| normalize_item(item, index, seed))
                .collect()
        })
        .unwrap_or_default();
    let warnings = breakdown
        .get("warnings")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let slots = breakdown
        .get("slots")
        .and_then(Value::as_object)
        .filter(|s| !s.is_empty())
        .cloned();
    LegacyBreakdown {
        items,
        warnings,
        slots,
    }
}

fn normalize_meta(
    meta: Option<&Map<String, Value>>,
    coverage: Option<&Value>,
    slot: &str,
    event: &str,
) -> Map<String, Value> {
    let mut base = meta.cloned().unwrap_or_default();
    if let Some(coverage) = coverage {
        base.insert("coverage".to_owned(), coverage.clone());
    }
    if !base.get("slot").is_some_and(is_truthy) {
        base.insert("slot".to_owned(), Value::String(slot.to_owned()));
    }
    if !base.get("event").is_some_and(is_truthy) {
        base.insert("event".to_owned(), Value::String(event.to_owned()));
    }
    base.insert(
        "adapter".to_owned(),
        json!({"version": ADAPTER_VERSION, "source": ADAPTER_SOURCE}),
    );
    base
}

/// Convert a shadow DTO to the legacy shape
///
/// # Errors
///
/// Returns `AdapterError::NotAnObject` when `shadow` is not a JSON object
pub fn adapt_shadow_to_legacy(shadow: &Value) -> Result<LegacyDto, AdapterError> {
    let dto = shadow.as_object().ok_or(AdapterError::NotAnObject {
        found: json_type(shadow),
    })?;
    let meta = dto.get("meta").and_then(Value::as_object);
    let nutrition_in = dto.get("nutrition").and_then(Value::as_object);
    let breakdown_in = dto.get("breakdown").and_then(Value::as_object);

    let dish = truthy_text(dto.get("dish")).unwrap_or_else(|| DEFAULT_DISH.to_owned());
    let confidence_raw = dto
        .get("confidence")
        .filter(|v| !v.is_null())
        .or_else(|| meta.and_then(|m| m.get("confidence")));
    let confidence = to_number(confidence_raw).unwrap_or(DEFAULT_CONFIDENCE);

    let macro_of = |key: &str| to_number(nutrition_in.and_then(|n| n.get(key))).unwrap_or(0.0);
    let nutrition = NutritionFacts {
        calories: macro_of("calories"),
        protein_g: macro_of("protein_g"),
        fat_g: macro_of("fat_g"),
        carbs_g: macro_of("carbs_g"),
    };
    let finalized = finalize_totals(Totals::from(nutrition), None, None);

    let seed = SEED_KEYS
        .iter()
        .find_map(|key| truthy_text(meta.and_then(|m| m.get(*key))))
        .or_else(|| truthy_text(dto.get("dish")))
        .unwrap_or_else(|| ADAPTER_SOURCE.to_owned());

    let slot = truthy_text(dto.get("slot"))
        .or_else(|| truthy_text(breakdown_in.and_then(|b| b.get("slot"))))
        .unwrap_or_else(|| DEFAULT_SLOT.to_owned());
    let event = truthy_text(dto.get("event")).unwrap_or_else(|| DEFAULT_EVENT.to_owned());
    let coverage = dto.get("coverage").filter(|v| !v.is_null());

    Ok(LegacyDto {
        dish,
        confidence,
        nutrition,
        atwater: finalized.atwater,
        breakdown: normalize_breakdown(breakdown_in, &seed),
        meta: normalize_meta(meta, coverage, &slot, &event),
        coverage: coverage.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_item_id(id: &str) -> bool {
        ITEM_ID.as_ref().is_some_and(|re| re.is_match(id))
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            adapt_shadow_to_legacy(&json!([1, 2])),
            Err(AdapterError::NotAnObject { found: "array" })
        );
        assert!(adapt_shadow_to_legacy(&Value::Null).is_err());
    }

    #[test]
    fn test_defaults() {
        let dto = adapt_shadow_to_legacy(&json!({})).unwrap();
        assert_eq!(dto.dish, DEFAULT_DISH);
        assert!((dto.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(dto.meta["slot"], json!("other"));
        assert_eq!(dto.meta["event"], json!("eat"));
        assert_eq!(dto.meta["adapter"]["version"], json!(ADAPTER_VERSION));
        assert!(dto.coverage.is_none());
        assert!(dto.breakdown.slots.is_none());
    }

    #[test]
    fn test_ids_are_stable_and_well_formed() {
        let shadow = json!({
            "dish": "牛丼",
            "breakdown": {"items": [
                {"code": "rice_cooked", "grams": 250},
                {"name": "牛肉", "qty_g": "90"},
                "garbage"
            ]}
        });
        let first = adapt_shadow_to_legacy(&shadow).unwrap();
        let second = adapt_shadow_to_legacy(&shadow).unwrap();
        assert_eq!(first, second);
        for item in &first.breakdown.items {
            assert!(is_item_id(&item.item_id), "bad id {}", item.item_id);
        }
        assert_ne!(first.breakdown.items[0].item_id, first.breakdown.items[1].item_id);
        assert!((first.breakdown.items[1].grams - 90.0).abs() < f64::EPSILON);
        assert!(first.breakdown.items[2].pending);
    }

    #[test]
    fn test_existing_id_reused_and_seed_matters() {
        let keep = "AAAAAAAAAAAAAAAAAAAAAA";
        let item = json!({"item_id": keep, "code": "miso_soup"});
        let object = item.as_object().unwrap();
        assert_eq!(stable_item_id(object, 0, "x"), keep);

        let fresh = json!({"code": "miso_soup"});
        let object = fresh.as_object().unwrap();
        assert_ne!(stable_item_id(object, 0, "a"), stable_item_id(object, 0, "b"));
        assert_ne!(stable_item_id(object, 0, "a"), stable_item_id(object, 1, "a"));
    }

    #[test]
    fn test_version_bits_are_set() {
        let item = json!({"name": "ごはん", "grams": 150});
        let id = stable_item_id(item.as_object().unwrap(), 3, "seed");
        let bytes = URL_SAFE_NO_PAD.decode(&id).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[6] & 0xf0, 0x40);
        assert_eq!(bytes[8] & 0xc0, 0x80);
    }

    #[test]
    fn test_meta_keeps_existing_slot_and_adds_coverage() {
        let shadow = json!({
            "confidence": "0.9",
            "nutrition": {"calories": 380, "protein_g": 23.5, "fat_g": 22.7, "carbs_g": 20.3},
            "meta": {"slot": "lunch", "hash": "h1"},
            "coverage": {"ratio": 1.0},
            "breakdown": {"warnings": ["w"], "slots": {"rice_size": {}}}
        });
        let dto = adapt_shadow_to_legacy(&shadow).unwrap();
        assert!((dto.confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(dto.meta["slot"], json!("lunch"));
        assert_eq!(dto.meta["coverage"], json!({"ratio": 1.0}));
        assert!(dto.atwater.pass);
        assert_eq!(dto.breakdown.warnings, vec![json!("w")]);
        assert!(dto.breakdown.slots.is_some());
    }
}
