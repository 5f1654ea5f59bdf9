// ABOUTME: Canonical ingredient and dish names from hiragana, katakana, half-width, and romaji spellings
// ABOUTME: Fish and roast names are guarded so they never collapse into cutlet categories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Name Resolver
//!
//! Canonicalization is exact-match on a normalized spelling (trimmed,
//! lowercased, inner whitespace removed). Partial matching is deliberately left
//! to the aggregator heuristics so that names like `カツオ` (bonito) or
//! `ローストビーフ` keep their identity.

use nutrilens_core::models::AnalyzedItem;

use crate::food_table;

/// Substrings that pin a name to itself
const GUARDED_TERMS: &[&str] = &[
    "カツオ",
    "鰹",
    "魚",
    "鮭",
    "サーモン",
    "さば",
    "鯖",
    "まぐろ",
    "マグロ",
    "ロースト",
    "roast",
    "salmon",
    "fish",
    "tuna",
    "mackerel",
    "bonito",
];

const INGREDIENT_ALIASES: &[(&str, &[&str])] = &[
    (
        "ごはん",
        &["ご飯", "ごはん", "ゴハン", "ｺﾞﾊﾝ", "白飯", "白米", "めし", "ライス", "ﾗｲｽ", "rice"],
    ),
    (
        "とんかつ",
        &["とんかつ", "トンカツ", "ﾄﾝｶﾂ", "豚カツ", "tonkatsu", "porkcutlet"],
    ),
    ("鶏肉", &["鶏肉", "鳥肉", "とりにく", "トリニク", "チキン", "ﾁｷﾝ", "chicken"]),
    ("豚肉", &["豚肉", "ぶたにく", "ブタニク", "ポーク", "ﾎﾟｰｸ", "pork"]),
    ("醤油", &["醤油", "しょうゆ", "ショウユ", "しょう油", "soysauce"]),
    ("キャベツ", &["キャベツ", "きゃべつ", "ｷｬﾍﾞﾂ", "cabbage"]),
    (
        "サラダ油",
        &["サラダ油", "油", "サラダオイル", "植物油", "oil", "vegetableoil", "saladoil"],
    ),
    ("小麦粉", &["小麦粉", "こむぎこ", "薄力粉", "強力粉", "flour"]),
    ("片栗粉", &["片栗粉", "かたくりこ", "カタクリコ", "potatostarch"]),
    ("うどん", &["うどん", "ウドン", "ｳﾄﾞﾝ", "饂飩", "udon"]),
];

const DISH_ALIASES: &[(&str, &[&str])] = &[
    ("牛丼", &["牛丼", "ぎゅうどん", "ギュウドン", "gyudon"]),
    ("とんかつ", &["とんかつ", "トンカツ", "ﾄﾝｶﾂ", "豚カツ", "tonkatsu"]),
    ("親子丼", &["親子丼", "おやこどん", "オヤコドン", "oyakodon"]),
    ("カツ丼", &["カツ丼", "かつ丼", "かつどん", "カツドン", "katsudon"]),
    ("唐揚げ", &["唐揚げ", "から揚げ", "からあげ", "カラアゲ", "ｶﾗｱｹﾞ", "karaage"]),
    ("ラーメン", &["ラーメン", "らーめん", "ﾗｰﾒﾝ", "拉麺", "ramen"]),
    ("カレーライス", &["カレーライス", "カレー", "ｶﾚｰ", "curry", "curryrice"]),
    ("うどん", &["うどん", "ウドン", "ｳﾄﾞﾝ", "udon"]),
    ("そば", &["そば", "蕎麦", "ソバ", "soba"]),
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// True when the name contains a fish or roast term
#[must_use]
pub fn is_guarded(name: &str) -> bool {
    let lowered = name.to_lowercase();
    GUARDED_TERMS.iter().any(|term| lowered.contains(term))
}

fn canon_with(table: &[(&'static str, &[&str])], name: &str) -> String {
    let trimmed = name.trim();
    if is_guarded(trimmed) {
        return trimmed.to_owned();
    }
    let key = normalize(trimmed);
    table
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| normalize(alias) == key))
        .map_or_else(|| trimmed.to_owned(), |(canonical, _)| (*canonical).to_owned())
}

/// Canonical ingredient name, or the trimmed input when no alias applies
#[must_use]
pub fn canon_ingredient(name: &str) -> String {
    canon_with(INGREDIENT_ALIASES, name)
}

/// Canonical dish name, or the trimmed input when no alias applies
#[must_use]
pub fn canon_dish(name: &str) -> String {
    canon_with(DISH_ALIASES, name)
}

/// Japanese display name of a food code
#[must_use]
pub fn display_name(code: &str) -> Option<&'static str> {
    food_table::entry(code).map(|entry| entry.display_name)
}

/// Replace names that merely repeat the code with the display name
#[must_use]
pub fn resolve_names(items: Vec<AnalyzedItem>) -> Vec<AnalyzedItem> {
    items
        .into_iter()
        .map(|mut item| {
            if let Some(code) = item.code.as_deref() {
                if item.name == code || item.name.trim().is_empty() {
                    if let Some(display) = display_name(code) {
                        display.clone_into(&mut item.name);
                    }
                }
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_variants_collapse() {
        assert_eq!(canon_ingredient(" ご飯 "), "ごはん");
        assert_eq!(canon_ingredient("ｷｬﾍﾞﾂ"), "キャベツ");
        assert_eq!(canon_ingredient("Chicken"), "鶏肉");
        assert_eq!(canon_dish("かつ丼"), "カツ丼");
    }

    #[test]
    fn test_unknown_name_passes_through_trimmed() {
        assert_eq!(canon_ingredient("  ブロッコリー "), "ブロッコリー");
    }

    #[test]
    fn test_fish_and_roast_keep_their_identity() {
        assert_eq!(canon_ingredient("カツオ"), "カツオ");
        assert_eq!(canon_ingredient("ローストビーフ"), "ローストビーフ");
        assert_ne!(canon_dish("カツオのたたき"), "とんかつ");
        assert_ne!(canon_dish("ローストチキン"), "とんかつ");
        assert_eq!(canon_ingredient(" Salmon "), "Salmon");
    }

    #[test]
    fn test_guarded_terms() {
        assert!(is_guarded("カツオのたたき"));
        assert!(is_guarded("ローストチキン"));
        assert!(is_guarded("Roast Beef"));
        assert!(is_guarded("fish cutlet"));
        assert!(!is_guarded("とんかつ"));
        assert!(!is_guarded("pork cutlet"));
    }
}
