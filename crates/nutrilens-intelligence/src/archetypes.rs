// ABOUTME: Static dish archetypes and dish-class keyword rules for deterministic substitution
// ABOUTME: Longest keyword wins for archetypes; keyword rules are first-match in declaration order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Dish Archetypes
//!
//! An archetype is a common Japanese set meal with named portion variants,
//! each a list of food codes and grams. Items produced from an archetype are
//! suggestions: they carry grams so totals are estimable, but they are marked
//! `pending` until the user confirms them through a slot.
//!
//! When no archetype keyword occurs in the text, a coarser keyword rule may
//! still recognize the dish class (set meal, rice bowl, noodles).

use std::sync::LazyLock;

use nutrilens_core::constants::estimator::ARCHETYPE_CONFIDENCE;
use nutrilens_core::models::{AnalyzedItem, SourceKind};
use regex::Regex;
use tracing::debug;

/// One portion variant of an archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portion {
    /// Variant key (`small`, `regular`, `large`)
    pub key: &'static str,
    /// Food code and grams
    pub items: &'static [(&'static str, f64)],
}

impl Portion {
    /// Grams of a code in this portion
    #[must_use]
    pub fn grams_of(&self, code: &str) -> Option<f64> {
        self.items
            .iter()
            .find(|(item_code, _)| *item_code == code)
            .map(|(_, grams)| *grams)
    }

    /// Pending items for this portion, names defaulting to codes
    #[must_use]
    pub fn pending_items(&self) -> Vec<AnalyzedItem> {
        self.items
            .iter()
            .map(|(code, grams)| AnalyzedItem::from_code(*code, *grams).into_pending())
            .collect()
    }
}

/// A recognizable set meal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    /// Stable identifier
    pub id: &'static str,
    /// Japanese dish name
    pub name: &'static str,
    /// Lowercase-comparable keywords
    pub keywords: &'static [&'static str],
    /// Ordered portion variants
    pub portions: &'static [Portion],
    /// Variant used when nothing was selected
    pub default_portion: &'static str,
}

impl Archetype {
    /// Portion by key
    #[must_use]
    pub fn portion(&self, key: &str) -> Option<&'static Portion> {
        self.portions.iter().find(|p| p.key == key)
    }

    /// Default portion, falling back to the first declared
    #[must_use]
    pub fn default_variant(&self) -> Option<&'static Portion> {
        self.portion(self.default_portion)
            .or_else(|| self.portions.first())
    }

    /// Portion keys in declaration order
    #[must_use]
    pub fn portion_keys(&self) -> Vec<&'static str> {
        self.portions.iter().map(|p| p.key).collect()
    }

    /// Character length of the longest keyword contained in `lowered`
    fn best_keyword_len(&self, lowered: &str) -> Option<usize> {
        self.keywords
            .iter()
            .filter(|kw| lowered.contains(&kw.to_lowercase()))
            .map(|kw| kw.chars().count())
            .max()
    }
}

const RICE: &str = "rice_cooked";
const MISO: &str = "miso_soup";
const CABBAGE: &str = "cabbage_raw";

static ARCHETYPES: &[Archetype] = &[
    Archetype {
        id: "gyudon",
        name: "牛丼",
        keywords: &["牛丼", "gyudon", "ぎゅうどん"],
        portions: &[
            Portion {
                key: "small",
                items: &[(RICE, 190.0), ("beef_sukiyaki_style", 65.0)],
            },
            Portion {
                key: "regular",
                items: &[(RICE, 250.0), ("beef_sukiyaki_style", 85.0)],
            },
            Portion {
                key: "large",
                items: &[(RICE, 320.0), ("beef_sukiyaki_style", 110.0)],
            },
        ],
        default_portion: "regular",
    },
    Archetype {
        id: "tonkatsu_teishoku",
        name: "とんかつ定食",
        keywords: &["とんかつ定食", "トンカツ定食", "とんかつ", "トンカツ", "豚カツ", "tonkatsu"],
        portions: &[
            Portion {
                key: "regular",
                items: &[
                    ("pork_loin_cutlet", 120.0),
                    (RICE, 200.0),
                    (CABBAGE, 50.0),
                    (MISO, 150.0),
                ],
            },
            Portion {
                key: "large",
                items: &[
                    ("pork_loin_cutlet", 150.0),
                    (RICE, 300.0),
                    (CABBAGE, 70.0),
                    (MISO, 150.0),
                ],
            },
        ],
        default_portion: "regular",
    },
    Archetype {
        id: "yakizakana_teishoku",
        name: "焼き魚定食",
        keywords: &["焼き魚定食", "焼魚定食", "焼き魚", "焼魚", "yakizakana"],
        portions: &[
            Portion {
                key: "regular",
                items: &[
                    ("grilled_salmon", 80.0),
                    (RICE, 200.0),
                    (MISO, 150.0),
                    ("tsukemono", 20.0),
                ],
            },
            Portion {
                key: "large",
                items: &[
                    ("grilled_salmon", 80.0),
                    (RICE, 300.0),
                    (MISO, 150.0),
                    ("tsukemono", 20.0),
                ],
            },
        ],
        default_portion: "regular",
    },
    Archetype {
        id: "oyakodon",
        name: "親子丼",
        keywords: &["親子丼", "oyakodon", "おやこどん"],
        portions: &[
            Portion {
                key: "regular",
                items: &[(RICE, 250.0), ("chicken_egg_donburi", 180.0)],
            },
            Portion {
                key: "large",
                items: &[(RICE, 320.0), ("chicken_egg_donburi", 220.0)],
            },
        ],
        default_portion: "regular",
    },
    Archetype {
        id: "katsudon",
        name: "カツ丼",
        keywords: &["カツ丼", "かつ丼", "katsudon"],
        portions: &[Portion {
            key: "regular",
            items: &[(RICE, 250.0), ("pork_cutlet_donburi", 200.0)],
        }],
        default_portion: "regular",
    },
    Archetype {
        id: "karaage_teishoku",
        name: "唐揚げ定食",
        keywords: &["唐揚げ定食", "から揚げ定食", "唐揚げ", "からあげ", "karaage"],
        portions: &[Portion {
            key: "regular",
            items: &[
                ("karaage_chicken", 150.0),
                (RICE, 200.0),
                (CABBAGE, 50.0),
                (MISO, 150.0),
            ],
        }],
        default_portion: "regular",
    },
    Archetype {
        id: "shoyu_ramen",
        name: "醤油ラーメン",
        keywords: &["醤油ラーメン", "ラーメン", "らーめん", "ramen"],
        portions: &[
            Portion {
                key: "regular",
                items: &[
                    ("ramen_noodles", 130.0),
                    ("ramen_soup_shoyu", 350.0),
                    ("chashu_pork", 30.0),
                    ("menma", 20.0),
                    ("ajitama_egg", 50.0),
                ],
            },
            Portion {
                key: "large",
                items: &[
                    ("ramen_noodles", 200.0),
                    ("ramen_soup_shoyu", 350.0),
                    ("chashu_pork", 30.0),
                    ("menma", 20.0),
                    ("ajitama_egg", 50.0),
                ],
            },
        ],
        default_portion: "regular",
    },
    Archetype {
        id: "curry_rice",
        name: "カレーライス",
        keywords: &["カレーライス", "カレー", "curry"],
        portions: &[
            Portion {
                key: "regular",
                items: &[(RICE, 250.0), ("curry_sauce_jp", 180.0)],
            },
            Portion {
                key: "large",
                items: &[(RICE, 350.0), ("curry_sauce_jp", 220.0)],
            },
        ],
        default_portion: "regular",
    },
];

/// Archetype hit with default-portion pending items
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeMatch {
    /// Matched archetype id
    pub archetype_id: &'static str,
    /// Archetype dish name
    pub dish: &'static str,
    /// Default portion items, all pending
    pub items: Vec<AnalyzedItem>,
    /// Fixed low confidence for template guesses
    pub confidence: f64,
}

/// Read-only view over the built-in archetypes
#[derive(Debug, Clone, Copy)]
pub struct ArchetypeRegistry {
    archetypes: &'static [Archetype],
}

impl Default for ArchetypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ArchetypeRegistry {
    /// Registry over the built-in table
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            archetypes: ARCHETYPES,
        }
    }

    /// Archetype by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'static Archetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// All archetypes in registration order
    #[must_use]
    pub const fn all(&self) -> &'static [Archetype] {
        self.archetypes
    }

    /// Best archetype for free text
    ///
    /// The archetype owning the longest contained keyword (by character count)
    /// wins; ties go to the earlier registration.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<ArchetypeMatch> {
        let lowered = text.to_lowercase();
        if lowered.trim().is_empty() {
            return None;
        }

        let mut best: Option<(&'static Archetype, usize)> = None;
        for archetype in self.archetypes {
            if let Some(len) = archetype.best_keyword_len(&lowered) {
                if best.is_none_or(|(_, best_len)| len > best_len) {
                    best = Some((archetype, len));
                }
            }
        }

        let (archetype, _) = best?;
        let portion = archetype.default_variant()?;
        debug!(archetype = archetype.id, portion = portion.key, "Archetype matched");
        Some(ArchetypeMatch {
            archetype_id: archetype.id,
            dish: archetype.name,
            items: portion.pending_items(),
            confidence: ARCHETYPE_CONFIDENCE,
        })
    }
}

/// Dish-class rule used when no archetype matches
struct KeywordRule {
    id: &'static str,
    pattern: Regex,
    items: &'static [(&'static str, f64)],
}

const KEYWORD_RULE_SOURCES: &[(&str, &str, &[(&str, f64)])] = &[
    ("teishoku", r"(?i)定食|teishoku", &[(RICE, 200.0)]),
    ("donburi", r"(?i)丼|donburi", &[(RICE, 250.0)]),
    (
        "udon",
        r"(?i)うどん|udon",
        &[("udon_noodles", 200.0), ("udon_soup", 300.0)],
    ),
    (
        "soba",
        r"(?i)そば|蕎麦|soba",
        &[("soba_noodles", 180.0), ("soba_tsuyu", 250.0)],
    ),
    ("rice", r"(?i)ライス|ご飯|ごはん|rice", &[(RICE, 200.0)]),
];

static KEYWORD_RULES: LazyLock<Vec<KeywordRule>> = LazyLock::new(|| {
    KEYWORD_RULE_SOURCES
        .iter()
        .filter_map(|&(id, source, items)| {
            Regex::new(source).ok().map(|pattern| KeywordRule {
                id,
                pattern,
                items,
            })
        })
        .collect()
});

/// Keyword rule hit with pending template items
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    /// Rule identifier (`teishoku`, `donburi`, ...)
    pub rule_id: &'static str,
    /// Template items, all pending
    pub items: Vec<AnalyzedItem>,
}

/// First keyword rule matching the text
#[must_use]
pub fn match_keyword(text: &str) -> Option<KeywordMatch> {
    KEYWORD_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| {
            debug!(rule = rule.id, "Keyword rule matched");
            KeywordMatch {
                rule_id: rule.id,
                items: rule
                    .items
                    .iter()
                    .map(|(code, grams)| AnalyzedItem::from_code(*code, *grams).into_pending())
                    .collect(),
            }
        })
}

/// Outcome of deterministic dish matching
#[derive(Debug, Clone, PartialEq)]
pub enum DishMatch {
    /// Archetype template
    Archetype(ArchetypeMatch),
    /// Dish-class keyword rule
    Keyword(KeywordMatch),
    /// Nothing recognizable
    None,
}

impl DishMatch {
    /// Source kind a substitution from this match reports
    #[must_use]
    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::Archetype(_) => SourceKind::Template,
            Self::Keyword(_) => SourceKind::Keyword,
            Self::None => SourceKind::Ai,
        }
    }

    /// Archetype id when the match came from an archetype
    #[must_use]
    pub const fn archetype_id(&self) -> Option<&'static str> {
        match self {
            Self::Archetype(m) => Some(m.archetype_id),
            Self::Keyword(_) | Self::None => None,
        }
    }

    /// Dish name suggested by the match
    #[must_use]
    pub const fn dish(&self) -> Option<&'static str> {
        match self {
            Self::Archetype(m) => Some(m.dish),
            Self::Keyword(_) | Self::None => None,
        }
    }

    /// Matched items, empty for `None`
    #[must_use]
    pub fn into_items(self) -> Vec<AnalyzedItem> {
        match self {
            Self::Archetype(m) => m.items,
            Self::Keyword(m) => m.items,
            Self::None => Vec::new(),
        }
    }

    /// Whether anything matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Archetype first, then keyword rules
#[must_use]
pub fn match_dish(text: &str) -> DishMatch {
    ArchetypeRegistry::builtin().find(text).map_or_else(
        || match_keyword(text).map_or(DishMatch::None, DishMatch::Keyword),
        DishMatch::Archetype,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_keyword_wins() {
        // "とんかつ定食" (6 chars) beats the bare "定食" rule and "とんかつ"
        let hit = ArchetypeRegistry::builtin().find("ロースとんかつ定食").unwrap();
        assert_eq!(hit.archetype_id, "tonkatsu_teishoku");
    }

    #[test]
    fn test_keyword_rules_are_ordered() {
        assert_eq!(match_keyword("天丼").unwrap().rule_id, "donburi");
        assert_eq!(match_keyword("鯖味噌定食").unwrap().rule_id, "teishoku");
        assert!(match_keyword("サラダ").is_none());
    }

    #[test]
    fn test_equal_length_tie_goes_to_earlier_archetype() {
        // "親子丼" and "カツ丼" are both three characters
        let registry = ArchetypeRegistry::builtin();
        assert_eq!(registry.find("親子丼とカツ丼").unwrap().archetype_id, "oyakodon");
        assert_eq!(registry.find("カツ丼と親子丼").unwrap().archetype_id, "oyakodon");
    }

    #[test]
    fn test_unmatched_text() {
        assert!(matches!(match_dish("謎の料理"), DishMatch::None));
        assert!(!match_dish("   ").is_match());
        assert!(match_dish("謎の料理").into_items().is_empty());
    }

    #[test]
    fn test_archetype_confidence_is_fixed_low() {
        let hit = ArchetypeRegistry::builtin().find("牛丼 並").unwrap();
        assert!((hit.confidence - 0.3).abs() < f64::EPSILON);
        assert!(hit.items.iter().all(|item| item.pending));
        assert!(matches!(match_dish("牛丼"), DishMatch::Archetype(_)));
    }
}
