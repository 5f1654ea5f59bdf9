// ABOUTME: Provenance helpers building Meta from a source kind or from legacy landing types
// ABOUTME: Legacy records without source_kind are read as recipe, keyword, or ai provenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::models::{FallbackLevel, Meta, SourceKind};

/// Landing type of records rescued by a default recipe
const LANDING_TEMPLATE_FALLBACK: &str = "template_fallback";
/// Landing type of records produced by a keyword rule
const LANDING_FALLBACK_KEYWORD: &str = "fallback_keyword";

/// Provenance for a source, level, and optional archetype
#[must_use]
pub fn make_meta(
    source_kind: SourceKind,
    fallback_level: FallbackLevel,
    archetype_id: Option<&str>,
) -> Meta {
    let meta = Meta::new(source_kind, fallback_level);
    match archetype_id {
        Some(id) if !id.is_empty() => meta.with_archetype(id),
        _ => meta,
    }
}

/// Read provenance from a legacy record
///
/// `template_fallback` maps to recipe/1 and `fallback_keyword` to keyword/1.
/// Without a landing type, an archetype alone still implies recipe/1; anything
/// else is treated as direct estimator output.
#[must_use]
pub fn derive_meta_from_legacy(landing_type: Option<&str>, archetype_id: Option<&str>) -> Meta {
    let (source_kind, level) = match (landing_type, archetype_id) {
        (Some(LANDING_TEMPLATE_FALLBACK), _) => (SourceKind::Recipe, FallbackLevel::Substituted),
        (Some(LANDING_FALLBACK_KEYWORD), _) => (SourceKind::Keyword, FallbackLevel::Substituted),
        (_, Some(id)) if !id.is_empty() => (SourceKind::Recipe, FallbackLevel::Substituted),
        _ => (SourceKind::Ai, FallbackLevel::Trusted),
    };
    make_meta(source_kind, level, archetype_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_types() {
        let meta = derive_meta_from_legacy(Some("template_fallback"), None);
        assert_eq!(meta.source_kind, SourceKind::Recipe);
        assert_eq!(meta.fallback_level, FallbackLevel::Substituted);

        let meta = derive_meta_from_legacy(Some("fallback_keyword"), Some("gyudon"));
        assert_eq!(meta.source_kind, SourceKind::Keyword);
        assert_eq!(meta.archetype_id.as_deref(), Some("gyudon"));
    }

    #[test]
    fn test_archetype_alone_is_recipe() {
        let meta = derive_meta_from_legacy(None, Some("curry_rice"));
        assert_eq!(meta.source_kind, SourceKind::Recipe);
        assert!(meta.is_fallback());
    }

    #[test]
    fn test_default_is_trusted_ai() {
        let meta = derive_meta_from_legacy(Some("other"), None);
        assert_eq!(meta, Meta::ai());
    }
}
