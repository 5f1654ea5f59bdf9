// ABOUTME: Main library entry point for the nutrilens meal nutrition estimation service
// ABOUTME: Wires providers, the orchestrator, the response cache, and guardrail hardening
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrilens
//!
//! Estimates protein, fat, carbohydrate, and calories for a free-text meal
//! description (primarily Japanese). A generative estimator is consulted
//! first; deterministic archetype and keyword knowledge takes over whenever it
//! is disabled, slow, failing, or returns nothing usable. Every result is
//! rounded once, checked against the Atwater equation, and can be hardened by
//! the guardrail pipeline before persistence.
//!
//! ## Architecture
//!
//! - **`nutrilens_core`**: errors, models, and constants
//! - **`nutrilens_intelligence`**: pure stages (policy, guardrails, archetypes, aggregation, slots)
//! - **`nutrilens_providers`**: circuit breaker, retry policy, estimator error taxonomy
//! - **this crate**: configuration, logging, the estimator client, providers,
//!   the orchestrator, caching, and the service facade
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrilens::providers::AnalyzeRequest;
//! use nutrilens::service::NutritionService;
//! use nutrilens_core::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let service = NutritionService::from_env()?;
//!     let result = service.analyze(AnalyzeRequest::new("とんかつ定食")).await?;
//!     println!("{} kcal", result.nutrition.calories);
//!     Ok(())
//! }
//! ```

/// Shadow and estimator payload adapters
pub mod adapters;

/// Single-flight response cache with TTL
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Generative estimator client
pub mod llm;

/// Logging configuration and subscriber setup
pub mod logging;

/// Analysis flow from provider output to final result
pub mod orchestrator;

/// Nutrition providers (estimator, deterministic, resilient, catalog-first)
pub mod providers;

/// Cached service facade with guardrail hardening
pub mod service;

pub use nutrilens_core::errors::{AppError, AppResult, ErrorCode};
pub use nutrilens_core::models::{AnalysisResult, AnalyzedItem, SlotSelection, SlotValue};
