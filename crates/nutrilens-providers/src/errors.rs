// ABOUTME: Estimator failure taxonomy with permanent versus transient classification
// ABOUTME: Permanent failures trip the breaker; transient ones are retried with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::errors::{AppError, ErrorCode};
use thiserror::Error;

/// Failure of a single estimator call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// The call exceeded its per-attempt timeout
    #[error("Estimator call timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The estimator answered with a server-side error
    #[error("Estimator returned HTTP {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Upstream error message
        message: String,
    },

    /// Model or endpoint does not exist
    #[error("Estimator resource not found: {message}")]
    NotFound {
        /// Upstream error message
        message: String,
    },

    /// Credentials rejected or model access denied
    #[error("Estimator access forbidden: {message}")]
    Forbidden {
        /// Upstream error message
        message: String,
    },

    /// Quota or rate limit exceeded
    #[error("Estimator rate limited: {message}")]
    RateLimited {
        /// Upstream error message
        message: String,
    },

    /// Connection-level failure before a response arrived
    #[error("Estimator transport error: {message}")]
    Transport {
        /// Client error message
        message: String,
    },

    /// Response arrived but could not be interpreted
    #[error("Estimator response invalid: {reason}")]
    InvalidResponse {
        /// What was wrong with the body
        reason: String,
    },

    /// Estimator not configured (missing key) or switched off
    #[error("Estimator disabled: {reason}")]
    Disabled {
        /// Why the estimator is unavailable
        reason: String,
    },
}

impl EstimatorError {
    /// Classify an HTTP error status
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound { message },
            403 => Self::Forbidden { message },
            429 => Self::RateLimited { message },
            _ => Self::Server { status, message },
        }
    }

    /// Whether retrying cannot help
    ///
    /// 404 and 403 are always permanent. 429 is permanent unless
    /// `retry_on_429` is set.
    #[must_use]
    pub const fn is_permanent(&self, retry_on_429: bool) -> bool {
        match self {
            Self::NotFound { .. } | Self::Forbidden { .. } | Self::Disabled { .. } => true,
            Self::RateLimited { .. } => !retry_on_429,
            Self::Timeout { .. }
            | Self::Server { .. }
            | Self::Transport { .. }
            | Self::InvalidResponse { .. } => false,
        }
    }
}

impl From<EstimatorError> for AppError {
    fn from(error: EstimatorError) -> Self {
        let code = match &error {
            EstimatorError::RateLimited { .. } => ErrorCode::ExternalRateLimited,
            EstimatorError::Timeout { .. }
            | EstimatorError::Transport { .. }
            | EstimatorError::Disabled { .. } => ErrorCode::ExternalServiceUnavailable,
            EstimatorError::Server { .. }
            | EstimatorError::NotFound { .. }
            | EstimatorError::Forbidden { .. }
            | EstimatorError::InvalidResponse { .. } => ErrorCode::ExternalServiceError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

/// Result alias for estimator calls
pub type EstimatorResult<T> = Result<T, EstimatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(EstimatorError::from_status(404, "model").is_permanent(false));
        assert!(EstimatorError::from_status(403, "key").is_permanent(true));
        assert!(EstimatorError::from_status(429, "quota").is_permanent(false));
        assert!(!EstimatorError::from_status(429, "quota").is_permanent(true));
        assert!(!EstimatorError::from_status(503, "busy").is_permanent(false));
    }
}
