// ABOUTME: Guardrail pipeline hardening untrusted nutrition payloads before display or storage
// ABOUTME: Stages run in order: schema parse, sanitize, Atwater reconcile, zero-floor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Guardrails
//!
//! A raw estimator payload of unknown shape goes through four stages:
//!
//! 1. [`schema::parse`] turns it into a [`CanonicalPayload`](nutrilens_core::models::CanonicalPayload)
//!    or fails with a path-carrying [`GuardrailError`](nutrilens_core::errors::GuardrailError)
//! 2. [`sanitize::sanitize`] clamps and rounds numbers and drops unidentifiable items
//! 3. [`reconcile::reconcile`] rescales macros toward the declared kcal when they disagree
//! 4. [`zero_floor::zero_floor`] lifts implausibly low meals to a minimum unless the
//!    text names a low-calorie drink
//!
//! [`GuardrailRunner`] wires the stages together and stamps the guardrail version.

/// Atwater reconciliation stage
pub mod reconcile;
/// Full pipeline runner
pub mod runner;
/// Numeric clamping stage
pub mod sanitize;
/// Strict shape parsing stage
pub mod schema;
/// Minimum-calorie floor stage
pub mod zero_floor;

use nutrilens_core::constants::guardrails::{
    DEFAULT_MAX_KCAL, DEFAULT_MIN_KCAL, DEFAULT_RECONCILE_TOLERANCE,
};
use serde::{Deserialize, Serialize};

pub use runner::GuardrailRunner;
pub use zero_floor::LowCalorieMatcher;

/// Numeric bounds shared by the stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardrailOptions {
    /// Floor applied to non-exempt meals
    pub min_kcal: f64,
    /// Ceiling for kcal in sanitize and zero-floor
    pub max_kcal: f64,
    /// Relative Atwater gap tolerated before macros are rescaled
    pub reconcile_tolerance: f64,
}

impl Default for GuardrailOptions {
    fn default() -> Self {
        Self {
            min_kcal: DEFAULT_MIN_KCAL,
            max_kcal: DEFAULT_MAX_KCAL,
            reconcile_tolerance: DEFAULT_RECONCILE_TOLERANCE,
        }
    }
}

/// Per-request context for a guardrail run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardrailContext<'a> {
    /// Free text the user submitted, checked against the low-calorie allowlist
    pub input_text: Option<&'a str>,
}

impl<'a> GuardrailContext<'a> {
    /// Context carrying the user's input text
    #[must_use]
    pub const fn for_text(input_text: &'a str) -> Self {
        Self {
            input_text: Some(input_text),
        }
    }
}
