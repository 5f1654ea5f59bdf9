// ABOUTME: Adapter contract errors raised when a shadow DTO cannot be mapped
// ABOUTME: A non-object DTO is a programming error and is not recoverable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Errors raised while adapting the shadow DTO to the legacy shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// The DTO root is not a JSON object
    #[error("Shadow DTO must be an object, found {found}")]
    NotAnObject {
        /// JSON type name of the value that was supplied
        found: &'static str,
    },
}
