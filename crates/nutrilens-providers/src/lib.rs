// ABOUTME: Resilience primitives for calls to the generative nutrition estimator
// ABOUTME: Circuit breaker, classified estimator errors, and exponential backoff policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Estimator resilience building blocks.
//!
//! The root crate composes these into its resilient provider; nothing here
//! knows about HTTP or the estimator wire format.

/// Circuit breaker shared by all estimator calls
pub mod circuit_breaker;
/// Estimator failure taxonomy
pub mod errors;
/// Retry and backoff policy
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use errors::{EstimatorError, EstimatorResult};
pub use retry::RetryPolicy;
