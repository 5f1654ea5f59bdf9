// ABOUTME: Payload adapters between external shapes and the pipeline's internal types
// ABOUTME: Estimator answers to provider output, shadow DTOs to legacy DTOs, provenance helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Shadow-to-legacy DTO adapter with stable item identifiers
pub mod dto;
/// Estimator answer normalization
pub mod estimator;
/// Provenance construction and legacy landing-type compatibility
pub mod meta;

pub use dto::{adapt_shadow_to_legacy, LegacyBreakdown, LegacyDto, LegacyItem};
pub use estimator::{strip_code_fences, to_provider_payload};
pub use meta::{derive_meta_from_legacy, make_meta};
