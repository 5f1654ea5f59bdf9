// ABOUTME: Guardrail thresholds: kcal floor and ceiling, reconcile tolerance, version tag
// ABOUTME: Defaults used when GUARD_KCAL_MIN, GUARD_KCAL_MAX, and friends are unset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Minimum plausible kcal for a non-beverage meal
pub const DEFAULT_MIN_KCAL: f64 = 120.0;

/// Upper clamp for any single analysis
pub const DEFAULT_MAX_KCAL: f64 = 2_000.0;

/// Relative Atwater deviation tolerated before macros are rescaled (10%)
pub const DEFAULT_RECONCILE_TOLERANCE: f64 = 0.1;

/// Guardrail release tag stamped into every guarded payload
pub const DEFAULT_GUARDRAIL_VERSION: &str = "2025-09-25-a";

/// Share of floored calories assigned to protein when no macros exist
pub const FLOOR_PROTEIN_SHARE: f64 = 0.30;

/// Share of floored calories assigned to fat when no macros exist
pub const FLOOR_FAT_SHARE: f64 = 0.35;

/// Built-in allowlist of near-zero-calorie foods and drinks
pub const BASE_LOW_CAL_PATTERN: &str = r"(?:水|お茶|ブラックコーヒー|緑茶|ほうじ茶|麦茶|sparkling\s*water|water|black\s*coffee|ゼロカロリー|diet\s+cola|ソーダ水)";

/// Warning tag for reconciled macros
pub const WARN_RECONCILED: &str = "reconciled";

/// Warning tag for floored kcal
pub const WARN_ZERO_FLOORED: &str = "zeroFloored";

/// Warning tag when the guardrail run itself failed
pub const WARN_GUARDRAIL_FAILED: &str = "guardrail_failed";
