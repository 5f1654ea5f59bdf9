// ABOUTME: Energy conservation policy constants (Atwater factors, rounding, oil absorption)
// ABOUTME: Shared by the aggregator, the finalizer, and the DTO adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// kcal per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;

/// kcal per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// kcal per gram of carbohydrate
pub const KCAL_PER_G_CARBS: f64 = 4.0;

/// Maximum relative Atwater deviation reported as passing (2%)
pub const ATWATER_TOLERANCE: f64 = 0.02;

/// Decimal digits kept for protein/fat/carbs after finalization
pub const MACRO_DIGITS: i32 = 1;

/// Oil absorbed by deep-fried dishes, low estimate (fraction of finished weight)
pub const OIL_ABSORPTION_MIN: f64 = 0.05;

/// Oil absorbed by deep-fried dishes, point estimate
pub const OIL_ABSORPTION_MID: f64 = 0.10;

/// Oil absorbed by deep-fried dishes, high estimate
pub const OIL_ABSORPTION_MAX: f64 = 0.15;

/// Frying oil energy density per 100 g (pure fat)
pub const OIL_KCAL_PER_100G: f64 = 900.0;

/// Evidence priority, most trusted first
pub const SOURCE_PRIORITY: &[&str] = &["label", "db", "category", "rule", "template"];

/// Version of the ingredient synonym tables
pub const SYNONYMS_VERSION: &str = "2025-09-14";
