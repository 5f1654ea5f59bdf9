// ABOUTME: Nutrient coefficient tables keyed by food code and by canonical ingredient name
// ABOUTME: Lookup falls back from code to representative category to name heuristics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Food Tables
//!
//! Two static tables back the aggregator:
//!
//! - a per-gram macro table keyed by food code, where kcal is derived with the
//!   Atwater factors so code-based items always pass the conservation check
//! - a per-100 g representative table keyed by canonical Japanese ingredient
//!   name, based on the Standard Tables of Food Composition in Japan
//!
//! Anything not found in either table goes through a small set of name
//! heuristics before it is reported as unknown.

use std::sync::LazyLock;

use nutrilens_core::models::{atwater_kcal, Totals};
use regex::Regex;

use crate::name_resolver::{canon_ingredient, is_guarded};

/// Per-gram macros for a coded food
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodEntry {
    /// Food code
    pub code: &'static str,
    /// Japanese display name
    pub display_name: &'static str,
    /// Protein grams per gram
    pub protein: f64,
    /// Fat grams per gram
    pub fat: f64,
    /// Carbohydrate grams per gram
    pub carbs: f64,
}

impl FoodEntry {
    /// Coefficients per 100 g with Atwater kcal
    #[must_use]
    pub fn per100(&self) -> Totals {
        let (protein, fat, carbs) = (self.protein * 100.0, self.fat * 100.0, self.carbs * 100.0);
        Totals::new(atwater_kcal(protein, fat, carbs), protein, fat, carbs)
    }
}

const fn food(
    code: &'static str,
    display_name: &'static str,
    protein: f64,
    fat: f64,
    carbs: f64,
) -> FoodEntry {
    FoodEntry {
        code,
        display_name,
        protein,
        fat,
        carbs,
    }
}

static FOODS: &[FoodEntry] = &[
    // Staples
    food("rice_cooked", "ごはん", 0.025, 0.003, 0.38),
    food("ramen_noodles", "中華麺", 0.1, 0.01, 0.6),
    food("udon_noodles", "うどん（ゆで）", 0.06, 0.01, 0.55),
    food("soba_noodles", "そば（ゆで）", 0.12, 0.01, 0.55),
    food("spaghetti_napolitan", "ナポリタン", 0.08, 0.08, 0.35),
    // Mains
    food("pork_loin_cutlet", "ロースかつ", 0.18, 0.22, 0.09),
    food("pork_fillet_cutlet", "ヒレかつ", 0.22, 0.12, 0.09),
    food("karaage_chicken", "鶏の唐揚げ", 0.14, 0.24, 0.04),
    food("pork_shogayaki", "豚の生姜焼き", 0.21, 0.11, 0.04),
    food("beef_sukiyaki_style", "牛丼の具", 0.16, 0.24, 0.1),
    food("chicken_egg_donburi", "親子丼の具", 0.084, 0.052, 0.056),
    food("pork_cutlet_donburi", "カツ丼の具", 0.069, 0.075, 0.134),
    food("grilled_salmon", "焼き鮭", 0.25, 0.15, 0.0),
    food("hamburger_steak", "ハンバーグ", 0.15, 0.2, 0.1),
    food("chashu_pork", "チャーシュー", 0.15, 0.3, 0.01),
    // Soups and sauces
    food("miso_soup", "味噌汁", 0.015, 0.007, 0.028),
    food("ramen_soup_shoyu", "醤油ラーメンスープ", 0.02, 0.03, 0.04),
    food("udon_soup", "うどんつゆ", 0.01, 0.01, 0.05),
    food("soba_tsuyu", "そばつゆ", 0.02, 0.0, 0.15),
    food("curry_sauce_jp", "カレールー", 0.05, 0.1, 0.15),
    // Sides and toppings
    food("ajitama_egg", "味玉", 0.13, 0.1, 0.01),
    food("menma", "メンマ", 0.02, 0.005, 0.04),
    food("cabbage_raw", "キャベツ（生）", 0.013, 0.001, 0.06),
    food("tsukemono", "漬物", 0.01, 0.0, 0.05),
];

/// Canonical name and its coefficients per 100 g
static REPRESENTATIVE: &[(&str, Totals)] = &[
    ("ごはん", Totals::new(168.0, 2.5, 0.3, 37.0)),
    // Includes batter and absorbed oil
    ("とんかつ", Totals::new(420.0, 22.0, 30.0, 15.0)),
    // Boiled noodles
    ("うどん", Totals::new(105.0, 2.6, 0.4, 21.6)),
    ("小麦粉", Totals::new(367.0, 8.0, 1.5, 76.0)),
    ("片栗粉", Totals::new(330.0, 0.0, 0.0, 82.6)),
    ("サラダ油", Totals::new(900.0, 0.0, 100.0, 0.0)),
    // Raw thigh
    ("鶏肉", Totals::new(197.0, 18.3, 12.1, 0.0)),
    ("豚肉", Totals::new(263.0, 20.5, 19.3, 0.0)),
    ("醤油", Totals::new(71.0, 7.7, 0.1, 3.4)),
    ("キャベツ", Totals::new(23.0, 1.3, 0.1, 5.2)),
];

const SUGAR_PER100: Totals = Totals::new(400.0, 0.0, 0.0, 100.0);

static CABBAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)キャベツ|cabbage").ok());
static TONKATSU_JA: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"とんかつ|豚.?カツ").ok());
static TONKATSU_EN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)cutlet|tonkatsu|pork.*cutlet").ok());
static OIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"油|オイル").ok());
static SUGAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"砂糖|シロップ").ok());
static RICE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"米|飯").ok());

/// Coefficients resolved for one item
#[derive(Debug, Clone, PartialEq)]
pub struct FoodHit {
    /// Coefficients per 100 g
    pub per100: Totals,
    /// Provenance tag such as `code:rice_cooked` or `category:ごはん`
    pub source: String,
}

/// Entry for a food code
#[must_use]
pub fn entry(code: &str) -> Option<&'static FoodEntry> {
    FOODS.iter().find(|f| f.code == code)
}

/// Whether the code is in the per-gram table
#[must_use]
pub fn is_known_code(code: &str) -> bool {
    entry(code).is_some()
}

/// Representative coefficients for a canonical ingredient name
#[must_use]
pub fn representative(canonical: &str) -> Option<Totals> {
    REPRESENTATIVE
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, per100)| *per100)
}

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

fn heuristic(name: &str, canonical: &str) -> Option<FoodHit> {
    let hit = |key: &str, source: &str| {
        representative(key).map(|per100| FoodHit {
            per100,
            source: source.to_owned(),
        })
    };

    if matches(&CABBAGE, name) {
        return hit("キャベツ", "heuristic:cabbage");
    }
    // Fish and roast names never take cutlet coefficients
    let guarded = is_guarded(name);
    if !guarded && matches(&TONKATSU_JA, name) {
        return hit("とんかつ", "heuristic:tonkatsu_ja");
    }
    if !guarded && matches(&TONKATSU_EN, name) {
        return hit("とんかつ", "heuristic:tonkatsu");
    }
    if matches(&OIL, canonical) {
        return hit("サラダ油", "heuristic:oil");
    }
    if matches(&SUGAR, canonical) {
        return Some(FoodHit {
            per100: SUGAR_PER100,
            source: "heuristic:sugar".to_owned(),
        });
    }
    if matches(&RICE, canonical) {
        return hit("ごはん", "heuristic:rice");
    }
    None
}

/// Resolve coefficients for an item by code, canonical name, then heuristics
#[must_use]
pub fn lookup(code: Option<&str>, name: &str) -> Option<FoodHit> {
    if let Some(found) = code.or(Some(name)).and_then(entry) {
        return Some(FoodHit {
            per100: found.per100(),
            source: format!("code:{}", found.code),
        });
    }

    let canonical = canon_ingredient(name);
    if let Some(per100) = representative(&canonical) {
        return Some(FoodHit {
            per100,
            source: format!("category:{canonical}"),
        });
    }

    heuristic(name, &canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_kcal_is_atwater() {
        let rice = entry("rice_cooked").unwrap().per100();
        assert!((rice.kcal - rice.atwater()).abs() < 1e-9);
        assert!((rice.kcal - 164.7).abs() < 1e-6);
    }

    #[test]
    fn test_lookup_order() {
        assert_eq!(lookup(Some("miso_soup"), "味噌汁").unwrap().source, "code:miso_soup");
        assert_eq!(lookup(None, "ご飯").unwrap().source, "category:ごはん");
        assert_eq!(lookup(None, "豚カツ弁当").unwrap().source, "heuristic:tonkatsu_ja");
        assert!(lookup(Some("dragon_fruit_x"), "謎の食材").is_none());
    }

    #[test]
    fn test_fish_cutlet_never_resolves_to_pork() {
        for name in ["salmon cutlet", "fish cutlet", "Tuna Cutlet", "鮭カツ", "カツオ"] {
            let source = lookup(None, name).map(|hit| hit.source);
            assert!(
                !source.as_deref().is_some_and(|s| s.starts_with("heuristic:tonkatsu")),
                "{name} resolved to {source:?}"
            );
        }
        assert_eq!(lookup(None, "pork cutlet sandwich").unwrap().source, "heuristic:tonkatsu");
    }
}
