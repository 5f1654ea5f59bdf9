// ABOUTME: Pure deterministic stages of the nutrition pipeline
// ABOUTME: Conservation policy, guardrails, dish matching, food tables, aggregation, and slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrilens Intelligence
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! `tracing` output. Providers and the orchestrator in the root crate compose
//! these stages; nothing here performs I/O.

/// Item-level aggregation into finalized totals
pub mod aggregator;
/// Dish archetypes and keyword rules
pub mod archetypes;
/// Per-gram code table and per-100 g representative table
pub mod food_table;
/// Four-stage hardening of untrusted nutrition payloads
pub mod guardrails;
/// Canonical ingredient and dish names
pub mod name_resolver;
/// Rounding and energy conservation policy
pub mod policy;
/// Refinement slots over an item list
pub mod slots;

pub use aggregator::{compute_from_items, Aggregation, Aggregator};
pub use archetypes::{
    match_dish, Archetype, ArchetypeMatch, ArchetypeRegistry, DishMatch, KeywordMatch,
};
pub use guardrails::{GuardrailContext, GuardrailOptions, GuardrailRunner, LowCalorieMatcher};
pub use policy::{finalize_totals, ConservationPolicy, Finalized, OilAbsorption};
pub use slots::{apply_slot, build_slots};
