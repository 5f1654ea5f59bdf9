// ABOUTME: Provenance metadata describing how a result was produced
// ABOUTME: SourceKind and a monotonically increasing FallbackLevel plus free-form extras
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the final numbers came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Generative estimator output, trusted as-is
    Ai,
    /// Default recipe applied after a failed substitution
    Recipe,
    /// Dish-class keyword rule
    Keyword,
    /// Archetype template matched by dish name
    Template,
}

impl SourceKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Recipe => "recipe",
            Self::Keyword => "keyword",
            Self::Template => "template",
        }
    }
}

/// Count of deterministic substitutions applied to estimator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FallbackLevel {
    /// Estimator output used directly
    #[default]
    Trusted,
    /// One deterministic substitution
    Substituted,
    /// Substitution after the first substitution produced nothing usable
    Rescued,
}

impl FallbackLevel {
    /// Numeric level as it appears on the wire
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Trusted => 0,
            Self::Substituted => 1,
            Self::Rescued => 2,
        }
    }
}

impl From<FallbackLevel> for u8 {
    fn from(level: FallbackLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for FallbackLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Trusted),
            1 => Ok(Self::Substituted),
            2 => Ok(Self::Rescued),
            other => Err(format!("fallback_level must be 0, 1 or 2, got {other}")),
        }
    }
}

/// Provenance attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Origin of the numbers
    pub source_kind: SourceKind,
    /// Substitutions applied so far
    pub fallback_level: FallbackLevel,
    /// Archetype that supplied the items, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
    /// Guardrail release that hardened the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrail_version: Option<String>,
    /// Provider, model, latency, and other diagnostic fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Create metadata for a source and level
    #[must_use]
    pub fn new(source_kind: SourceKind, fallback_level: FallbackLevel) -> Self {
        Self {
            source_kind,
            fallback_level,
            archetype_id: None,
            guardrail_version: None,
            extra: Map::new(),
        }
    }

    /// Trusted estimator output
    #[must_use]
    pub fn ai() -> Self {
        Self::new(SourceKind::Ai, FallbackLevel::Trusted)
    }

    /// Attach an archetype id
    #[must_use]
    pub fn with_archetype(mut self, archetype_id: impl Into<String>) -> Self {
        self.archetype_id = Some(archetype_id.into());
        self
    }

    /// Attach a diagnostic field
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a diagnostic field
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.extra.insert(key.to_owned(), value.into());
    }

    /// Replace provenance for a new substitution; the level never decreases
    pub fn substitute(&mut self, source_kind: SourceKind, level: FallbackLevel) {
        self.source_kind = source_kind;
        self.fallback_level = self.fallback_level.max(level);
    }

    /// True when any deterministic substitution happened
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback_level > FallbackLevel::Trusted
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::ai()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_level_serializes_as_number() {
        let meta = Meta::new(SourceKind::Template, FallbackLevel::Substituted)
            .with_archetype("gyudon")
            .with_extra("provider", "ai");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["fallback_level"], json!(1));
        assert_eq!(value["source_kind"], json!("template"));
        assert_eq!(value["provider"], json!("ai"));
    }

    #[test]
    fn test_substitute_never_lowers_level() {
        let mut meta = Meta::new(SourceKind::Recipe, FallbackLevel::Rescued);
        meta.substitute(SourceKind::Template, FallbackLevel::Substituted);
        assert_eq!(meta.fallback_level, FallbackLevel::Rescued);
        assert_eq!(meta.source_kind, SourceKind::Template);
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(FallbackLevel::try_from(3).is_err());
    }
}
