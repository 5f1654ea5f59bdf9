// ABOUTME: Unified error handling with error codes and the application-wide AppError type
// ABOUTME: Re-exports domain error enums for guardrails and DTO adaptation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! This module provides a centralized error handling system for the pipeline.
//! Domain errors (`GuardrailError`, `AdapterError`) carry structured context and
//! convert into `AppError` when they cross a public API boundary.

/// DTO adapter contract violations
pub mod adapter;
/// Guardrail schema and configuration errors
pub mod guardrail;

pub use adapter::AdapterError;
pub use guardrail::GuardrailError;

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Caller supplied an input that violates the contract
    InvalidInput = 3000,
    /// Input is structurally malformed
    InvalidFormat = 3002,

    // Resource Management (4000-4999)
    /// Requested resource does not exist
    ResourceNotFound = 4000,

    // External Services (5000-5999)
    /// External estimator returned an error
    ExternalServiceError = 5000,
    /// External estimator is not reachable or disabled
    ExternalServiceUnavailable = 5001,
    /// External estimator is throttling requests
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Configuration could not be loaded
    ConfigError = 6000,
    /// Configuration value is present but invalid
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// JSON encoding or decoding failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code an outer layer should map this error to
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidFormat => 400,
            Self::ResourceNotFound => 404,
            Self::ExternalServiceError | Self::ExternalServiceUnavailable => 502,
            Self::ExternalRateLimited => 503,
            Self::ConfigError
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidFormat => "The input format is incorrect",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "The nutrition estimator returned an error",
            Self::ExternalServiceUnavailable => "The nutrition estimator is unavailable",
            Self::ExternalRateLimited => "The nutrition estimator is rate limiting requests",
            Self::ConfigError => "Configuration error",
            Self::ConfigInvalid => "Configuration value is invalid",
            Self::InternalError => "An internal error occurred",
            Self::SerializationError => "Failed to serialize or deserialize data",
        }
    }
}

/// Unified error type for the pipeline
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{service}: {}", message.into()),
        )
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<GuardrailError> for AppError {
    fn from(error: GuardrailError) -> Self {
        let code = match &error {
            GuardrailError::Schema { .. } => ErrorCode::InvalidInput,
            GuardrailError::InvalidPattern { .. } => ErrorCode::ConfigInvalid,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

impl From<AdapterError> for AppError {
    fn from(error: AdapterError) -> Self {
        Self::new(ErrorCode::InvalidFormat, error.to_string()).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardrail_error_maps_to_invalid_input() {
        let err: AppError = GuardrailError::Schema {
            path: "totals.kcal".to_owned(),
            expected: "number or numeric string",
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.http_status(), 400);
        assert!(err.message.contains("totals.kcal"));
    }

    #[test]
    fn test_adapter_error_maps_to_invalid_format() {
        let err: AppError = AdapterError::NotAnObject { found: "array" }.into();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.to_string().contains("array"));
    }
}
