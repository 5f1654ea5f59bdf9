// ABOUTME: Refinement slots (portion size, rice amount, pork cut) derived from the current items
// ABOUTME: Applying a slot returns a new item list and is idempotent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::errors::{AppError, AppResult};
use nutrilens_core::models::{AnalyzedItem, Slot, SlotSelection, SlotValue, Slots};

use crate::archetypes::ArchetypeRegistry;

/// Portion variant selection for archetype meals
pub const PORTION_SIZE: &str = "portion_size";
/// Cooked rice grams
pub const RICE_SIZE: &str = "rice_size";
/// Loin versus fillet cutlet
pub const PORK_CUT: &str = "pork_cut";

const RICE_CODE: &str = "rice_cooked";
const PORK_PREFIX: &str = "pork_";
const PORK_LOIN: &str = "pork_loin_cutlet";
const PORK_FILLET: &str = "pork_fillet_cutlet";
const RICE_OPTIONS: [f64; 3] = [150.0, 200.0, 300.0];
const DEFAULT_RICE_GRAMS: f64 = 200.0;
const DEFAULT_CUTLET_GRAMS: f64 = 120.0;
const LOIN_LABEL: &str = "ロース";
const FILLET_LABEL: &str = "ヒレ";
const FILLET_SPELLINGS: &[&str] = &["ヒレ", "ﾋﾚ", "ﾌｨﾚ", "フィレ", "fillet", "filet"];

fn is_rice(item: &AnalyzedItem) -> bool {
    item.code.as_deref() == Some(RICE_CODE)
}

fn is_pork(item: &AnalyzedItem) -> bool {
    item.code.as_deref().is_some_and(|c| c.contains(PORK_PREFIX))
}

/// Build the slots that apply to `items`
#[must_use]
pub fn build_slots(items: &[AnalyzedItem], archetype_id: Option<&str>) -> Slots {
    let mut slots = Slots::new();

    if let Some(archetype) = archetype_id.and_then(|id| ArchetypeRegistry::builtin().get(id)) {
        if archetype.portions.len() > 1 {
            slots.insert(
                PORTION_SIZE.to_owned(),
                Slot {
                    key: PORTION_SIZE.to_owned(),
                    question: "量を選んでください".to_owned(),
                    options: archetype.portion_keys().into_iter().map(SlotValue::from).collect(),
                    selected: SlotValue::from(archetype.default_portion),
                    unit: None,
                },
            );
        }
    }

    if let Some(rice) = items.iter().find(|i| is_rice(i)) {
        slots.insert(
            RICE_SIZE.to_owned(),
            Slot {
                key: RICE_SIZE.to_owned(),
                question: "ご飯の量は？".to_owned(),
                options: RICE_OPTIONS.into_iter().map(SlotValue::Number).collect(),
                selected: SlotValue::Number(rice.grams.unwrap_or(DEFAULT_RICE_GRAMS)),
                unit: Some("g".to_owned()),
            },
        );
    }

    if let Some(pork) = items.iter().find(|i| is_pork(i)) {
        let selected = if pork.code.as_deref() == Some(PORK_FILLET) {
            FILLET_LABEL
        } else {
            LOIN_LABEL
        };
        slots.insert(
            PORK_CUT.to_owned(),
            Slot {
                key: PORK_CUT.to_owned(),
                question: "部位は？".to_owned(),
                options: vec![SlotValue::from(LOIN_LABEL), SlotValue::from(FILLET_LABEL)],
                selected: SlotValue::from(selected),
                unit: None,
            },
        );
    }

    slots
}

/// Apply a slot answer, returning the updated item list
///
/// The input is never mutated and applying the same answer twice yields the
/// same list as applying it once.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` for an unknown key, a non-positive or
/// non-numeric rice amount, or a portion that the archetype does not define.
pub fn apply_slot(
    items: &[AnalyzedItem],
    selection: &SlotSelection,
    archetype_id: Option<&str>,
) -> AppResult<Vec<AnalyzedItem>> {
    let mut out = items.to_vec();

    match selection.key.as_str() {
        PORTION_SIZE => apply_portion(&mut out, &selection.value, archetype_id)?,
        RICE_SIZE => {
            let grams = selection
                .value
                .as_number()
                .filter(|g| g.is_finite() && *g > 0.0)
                .ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "rice_size expects positive grams, got '{}'",
                        selection.value
                    ))
                })?;
            if let Some(rice) = out.iter_mut().find(|i| is_rice(i)) {
                rice.grams = Some(grams);
                rice.pending = false;
            } else {
                out.push(AnalyzedItem::from_code(RICE_CODE, grams));
            }
        }
        PORK_CUT => {
            let value = selection.value.to_string().trim().to_lowercase();
            let target = if FILLET_SPELLINGS.iter().any(|s| s.to_lowercase() == value) {
                PORK_FILLET
            } else {
                PORK_LOIN
            };
            if let Some(pork) = out.iter_mut().find(|i| is_pork(i)) {
                if pork.code.as_deref() == Some(pork.name.as_str()) {
                    target.clone_into(&mut pork.name);
                }
                pork.code = Some(target.to_owned());
                pork.source = None;
                pork.per100 = None;
                pork.pending = false;
            } else {
                out.push(AnalyzedItem::from_code(target, DEFAULT_CUTLET_GRAMS));
            }
        }
        other => {
            return Err(AppError::invalid_input(format!("Unknown slot key '{other}'")));
        }
    }

    Ok(out)
}

fn apply_portion(
    items: &mut Vec<AnalyzedItem>,
    value: &SlotValue,
    archetype_id: Option<&str>,
) -> AppResult<()> {
    let archetype = archetype_id
        .and_then(|id| ArchetypeRegistry::builtin().get(id))
        .ok_or_else(|| AppError::invalid_input("portion_size requires a known archetype"))?;
    let key = value.to_string();
    let portion = archetype.portion(&key).ok_or_else(|| {
        AppError::invalid_input(format!(
            "Archetype '{}' has no portion '{key}'",
            archetype.id
        ))
    })?;

    for item in items.iter_mut() {
        if let Some(grams) = item.code.as_deref().and_then(|code| portion.grams_of(code)) {
            item.grams = Some(grams);
            item.pending = false;
        }
    }
    for &(code, grams) in portion.items {
        if !items.iter().any(|i| i.code.as_deref() == Some(code)) {
            items.push(AnalyzedItem::from_code(code, grams));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_follow_items() {
        let items = vec![
            AnalyzedItem::from_code(PORK_FILLET, 120.0),
            AnalyzedItem::from_code(RICE_CODE, 150.0),
        ];
        let slots = build_slots(&items, None);

        assert!(!slots.contains_key(PORTION_SIZE));
        assert_eq!(slots[RICE_SIZE].selected, SlotValue::Number(150.0));
        assert_eq!(slots[RICE_SIZE].unit.as_deref(), Some("g"));
        assert_eq!(slots[PORK_CUT].selected, SlotValue::from(FILLET_LABEL));
    }

    #[test]
    fn test_portion_slot_lists_archetype_variants() {
        let slots = build_slots(&[], Some("gyudon"));
        let portion = &slots[PORTION_SIZE];
        assert_eq!(portion.options.len(), 3);
        assert_eq!(portion.selected, SlotValue::from("regular"));
    }

    #[test]
    fn test_missing_items_are_appended_confirmed() {
        let rice = apply_slot(&[], &SlotSelection::new(RICE_SIZE, 300.0), None).unwrap();
        assert_eq!(rice.len(), 1);
        assert_eq!(rice[0].grams, Some(300.0));

        let small = apply_slot(&[], &SlotSelection::new(PORTION_SIZE, "small"), Some("gyudon"))
            .unwrap();
        assert_eq!(small.len(), 2);
        assert!(small.iter().all(|i| !i.pending));
    }
}
