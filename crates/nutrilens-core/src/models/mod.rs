// ABOUTME: Core data models for the nutrition estimation pipeline
// ABOUTME: Totals, analyzed items, provenance metadata, slots, canonical payloads, and results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Data models shared across the pipeline crates.
//!
//! Everything here is created fresh per request and discarded once the
//! response has been produced.

/// Final response contract
pub mod analysis;
/// Food items as they flow through aggregation and display
pub mod item;
/// Provenance metadata (`source_kind`, `fallback_level`)
pub mod meta;
/// Energy and macro totals plus the Atwater equation
pub mod nutrition;
/// Canonical guardrail payload
pub mod payload;
/// Interactive refinement choices
pub mod slot;

pub use analysis::{AnalysisResult, AtwaterCheck, Breakdown, NutritionFacts, NutritionRange};
pub use item::AnalyzedItem;
pub use meta::{FallbackLevel, Meta, SourceKind};
pub use nutrition::{atwater_kcal, Totals, WarningSet};
pub use payload::{CanonicalItem, CanonicalPayload, GuardedBreakdown, GuardedPayload};
pub use slot::{Slot, SlotSelection, SlotValue, Slots};
