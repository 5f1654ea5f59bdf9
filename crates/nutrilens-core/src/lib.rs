// ABOUTME: Core types and constants for the nutrilens meal estimation pipeline
// ABOUTME: Foundation crate with error handling, nutrition models, and policy constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Nutrilens Core
//!
//! Foundation crate providing shared types and constants for the nutrilens
//! estimation pipeline. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and domain-specific errors
//! - **constants**: Policy, guardrail, resilience, and cache defaults organized by domain
//! - **models**: Totals, analyzed items, response metadata, slots, and the analysis result

/// Unified error handling system with standard error codes
pub mod errors;

/// Pipeline constants organized by domain
pub mod constants;

/// Nutrition data models shared by every pipeline stage
pub mod models;
