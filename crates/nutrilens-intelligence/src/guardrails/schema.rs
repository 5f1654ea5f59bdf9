// ABOUTME: Strict parse of a raw nutrition payload into the canonical shape
// ABOUTME: Accepts numbers or numeric strings and reports wrong types with their JSON path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::errors::GuardrailError;
use nutrilens_core::models::{CanonicalItem, CanonicalPayload, Totals, WarningSet};
use serde_json::{Map, Value};

const EXPECT_NUMBER: &str = "number or numeric string";
const EXPECT_STRING: &str = "string or null";
const EXPECT_OBJECT: &str = "object";
const EXPECT_ARRAY: &str = "array";

/// Parse an untrusted payload
///
/// Totals come from `totals` (with a required `kcal`), else from a legacy
/// `nutrition` block, else zero. Item grams use the first finite value among
/// `grams`, `qty_g`, `quantity_g`, `g`, and `amount`. Unparseable numeric
/// strings survive as `NaN` so that sanitize can zero them.
///
/// # Errors
///
/// Returns `GuardrailError::Schema` when the root is not an object or a field
/// has the wrong JSON type.
pub fn parse(raw: &Value) -> Result<CanonicalPayload, GuardrailError> {
    let root = raw
        .as_object()
        .ok_or_else(|| GuardrailError::schema("$", EXPECT_OBJECT))?;

    let dish = optional_string(root.get("dish"), "dish")?;
    let totals = match non_null(root.get("totals")) {
        Some(totals) => parse_totals(totals)?,
        None => parse_nutrition(non_null(root.get("nutrition")))?,
    };

    let items = match non_null(root.get("items")) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_item(item, index))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(GuardrailError::schema("items", EXPECT_ARRAY)),
        None => Vec::new(),
    };

    let warnings = match non_null(root.get("warnings")) {
        Some(Value::Array(list)) => {
            let mut warnings = Vec::with_capacity(list.len());
            for (index, warning) in list.iter().enumerate() {
                let text = warning
                    .as_str()
                    .ok_or_else(|| GuardrailError::schema(format!("warnings[{index}]"), "string"))?;
                warnings.push(text.to_owned());
            }
            warnings.into_iter().collect::<WarningSet>()
        }
        Some(_) => return Err(GuardrailError::schema("warnings", EXPECT_ARRAY)),
        None => WarningSet::new(),
    };

    let confidence = number_like(root.get("confidence"), "confidence")?.filter(|c| c.is_finite());

    let meta = match non_null(root.get("meta")) {
        Some(Value::Object(meta)) => meta.clone(),
        Some(_) => return Err(GuardrailError::schema("meta", EXPECT_OBJECT)),
        None => Map::new(),
    };

    Ok(CanonicalPayload {
        dish,
        totals,
        items,
        warnings,
        confidence,
        meta,
    })
}

fn parse_totals(value: &Value) -> Result<Totals, GuardrailError> {
    let totals = value
        .as_object()
        .ok_or_else(|| GuardrailError::schema("totals", EXPECT_OBJECT))?;
    let kcal = number_like(totals.get("kcal"), "totals.kcal")?
        .ok_or_else(|| GuardrailError::schema("totals.kcal", EXPECT_NUMBER))?;

    Ok(Totals::new(
        kcal,
        macro_field(totals, "totals", "protein_g", "protein")?.unwrap_or(0.0),
        macro_field(totals, "totals", "fat_g", "fat")?.unwrap_or(0.0),
        macro_field(totals, "totals", "carbs_g", "carbs")?.unwrap_or(0.0),
    ))
}

fn parse_nutrition(value: Option<&Value>) -> Result<Totals, GuardrailError> {
    let Some(value) = value else {
        return Ok(Totals::ZERO);
    };
    let nutrition = value
        .as_object()
        .ok_or_else(|| GuardrailError::schema("nutrition", EXPECT_OBJECT))?;
    let field = |key: &str| -> Result<f64, GuardrailError> {
        Ok(number_like(nutrition.get(key), &format!("nutrition.{key}"))?.unwrap_or(0.0))
    };

    Ok(Totals::new(
        field("calories")?,
        field("protein_g")?,
        field("fat_g")?,
        field("carbs_g")?,
    ))
}

fn parse_item(value: &Value, index: usize) -> Result<CanonicalItem, GuardrailError> {
    let prefix = format!("items[{index}]");
    let item = value
        .as_object()
        .ok_or_else(|| GuardrailError::schema(prefix.clone(), EXPECT_OBJECT))?;
    let path = |key: &str| format!("{prefix}.{key}");

    let name = optional_string(item.get("name"), &path("name"))?;
    let code = optional_string(item.get("code"), &path("code"))?;
    let source = optional_string(item.get("source"), &path("source"))?;
    let note = optional_string(item.get("note"), &path("note"))?;

    let mut grams = None;
    for key in ["grams", "qty_g", "quantity_g", "g", "amount"] {
        let candidate = number_like(item.get(key), &path(key))?;
        if grams.is_none() {
            grams = candidate.filter(|g| g.is_finite());
        }
    }

    Ok(CanonicalItem {
        name: name.or_else(|| code.clone()),
        code,
        source,
        grams,
        kcal: number_like(item.get("kcal"), &path("kcal"))?.filter(|k| k.is_finite()),
        protein_g: macro_field(item, &prefix, "protein_g", "protein")?,
        fat_g: macro_field(item, &prefix, "fat_g", "fat")?,
        carbs_g: macro_field(item, &prefix, "carbs_g", "carbs")?,
        confidence: number_like(item.get("confidence"), &path("confidence"))?
            .filter(|c| c.is_finite()),
        note,
    })
}

/// First finite value of `primary` then `alias`
fn macro_field(
    object: &Map<String, Value>,
    prefix: &str,
    primary: &str,
    alias: &str,
) -> Result<Option<f64>, GuardrailError> {
    let first = number_like(object.get(primary), &format!("{prefix}.{primary}"))?;
    let second = number_like(object.get(alias), &format!("{prefix}.{alias}"))?;
    Ok(first
        .filter(|v| v.is_finite())
        .or_else(|| second.filter(|v| v.is_finite())))
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn optional_string(value: Option<&Value>, path: &str) -> Result<Option<String>, GuardrailError> {
    match non_null(value) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(GuardrailError::schema(path, EXPECT_STRING)),
    }
}

/// Number or numeric string; empty strings read as zero, garbage as `NaN`
fn number_like(value: Option<&Value>, path: &str) -> Result<Option<f64>, GuardrailError> {
    match non_null(value) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().unwrap_or(f64::NAN))),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Some(0.0));
            }
            let parsed = trimmed.parse::<f64>().unwrap_or(f64::NAN);
            Ok(Some(if parsed.is_finite() { parsed } else { f64::NAN }))
        }
        Some(_) => Err(GuardrailError::schema(path, EXPECT_NUMBER)),
    }
}
