// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for policy, guardrails, estimator resilience, and caching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.
//! Environment-driven configuration falls back to these values.

/// Shadow-to-legacy DTO adapter defaults
pub mod adapter;
/// Response cache TTL and capacity
pub mod cache;
/// Estimator model identifiers and confidence baselines
pub mod estimator;
/// Guardrail thresholds and version tag
pub mod guardrails;
/// Conservation policy (Atwater tolerance, rounding, oil absorption)
pub mod policy;
/// Timeout, retry, and circuit breaker defaults
pub mod resilience;
