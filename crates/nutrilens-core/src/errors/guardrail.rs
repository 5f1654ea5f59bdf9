// ABOUTME: Guardrail error types for schema normalization and stage configuration
// ABOUTME: Schema violations are fatal input-contract errors propagated to the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Errors raised by the guardrail pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardrailError {
    /// A field of the raw payload has an unusable shape
    #[error("Schema violation at '{path}': expected {expected}")]
    Schema {
        /// JSON path of the offending field (e.g. `items[2].grams`)
        path: String,
        /// Description of the accepted shape
        expected: &'static str,
    },

    /// The configured low-calorie allowlist extension does not compile
    #[error("Invalid low-calorie pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as supplied through configuration
        pattern: String,
        /// Compiler error message
        reason: String,
    },
}

impl GuardrailError {
    /// Build a schema violation for the given path
    pub fn schema(path: impl Into<String>, expected: &'static str) -> Self {
        Self::Schema {
            path: path.into(),
            expected,
        }
    }
}
