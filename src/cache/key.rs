// ABOUTME: Deterministic cache keys for analysis results
// ABOUTME: A model, prompt, or guardrail version bump produces a different key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use nutrilens_core::constants::cache::CACHE_KEY_PREFIX;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Everything that can change an analysis answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKeyParts<'a> {
    /// Raw meal text
    pub text: &'a str,
    /// Request locale
    pub locale: &'a str,
    /// Provider mode (`ai`, `hybrid`, `dict`)
    pub provider: &'a str,
    /// Estimator model
    pub model: &'a str,
    /// Model version tag
    pub model_version: &'a str,
    /// Prompt version tag
    pub prompt_version: &'a str,
    /// Guardrail release
    pub guardrail_version: &'a str,
}

/// Hashed payload; field order is part of the key contract
#[derive(Serialize)]
struct KeyPayload<'a> {
    normalized: &'a str,
    locale: &'a str,
    provider: &'a str,
    model: &'a str,
    model_version: &'a str,
    prompt_version: &'a str,
    guardrail_version: &'a str,
}

/// Collapse whitespace runs, trim, and lowercase
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let collapsed = WHITESPACE
        .as_ref()
        .map_or_else(|| text.to_owned(), |re| re.replace_all(text, " ").into_owned());
    collapsed.trim().to_lowercase()
}

/// `nutrition:` followed by the hex SHA-256 of the key payload
#[must_use]
pub fn cache_key(parts: &CacheKeyParts<'_>) -> String {
    let normalized = normalize_text(parts.text);
    let payload = KeyPayload {
        normalized: &normalized,
        locale: parts.locale,
        provider: parts.provider,
        model: parts.model,
        model_version: parts.model_version,
        prompt_version: parts.prompt_version,
        guardrail_version: parts.guardrail_version,
    };
    let encoded = serde_json::to_vec(&payload).unwrap_or_default();
    format!("{CACHE_KEY_PREFIX}{}", hex::encode(Sha256::digest(&encoded)))
}
