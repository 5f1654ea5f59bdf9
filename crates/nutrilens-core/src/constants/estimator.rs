// ABOUTME: Estimator model identifiers, prompt versioning, and confidence baselines
// ABOUTME: Version tags participate in cache keys so a model bump invalidates results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default model version tag
pub const DEFAULT_MODEL_VERSION: &str = "2025-09-25-a";

/// Default prompt version tag
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

/// Default locale of incoming meal descriptions
pub const DEFAULT_LOCALE: &str = "ja";

/// Confidence of a name-only archetype match
pub const ARCHETYPE_CONFIDENCE: f64 = 0.3;

/// Confidence used when no upstream value is usable
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Catalog hits below this confidence carry `db_low_confidence`
pub const CATALOG_LOW_CONFIDENCE: f64 = 0.8;

/// Catalog candidates considered per lookup
pub const DEFAULT_CANDIDATE_LIMIT: usize = 3;
