// ABOUTME: Generative estimator abstraction used by the nutrition providers
// ABOUTME: Defines the EstimatorClient contract, request shape, and raw response variants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Estimator Client Interface
//!
//! The estimator is an opaque black box: it receives a meal description (and
//! optionally a photo) and answers with something that is hopefully JSON.
//! Interpretation of that answer belongs to `adapters::estimator`; clients only
//! move bytes and classify transport failures into [`EstimatorError`].
//!
//! ## Example: Using a Client
//!
//! ```rust,no_run
//! use nutrilens::llm::{EstimateRequest, EstimatorClient, GeminiEstimator};
//!
//! async fn example() {
//!     let Ok(client) = GeminiEstimator::from_env() else { return };
//!     let request = EstimateRequest::new("鮭の塩焼き定食", "ja");
//!     let raw = client.estimate(&request).await;
//! }
//! ```

mod gemini;

pub use gemini::GeminiEstimator;

use async_trait::async_trait;
use nutrilens_core::constants::estimator::DEFAULT_PROMPT_VERSION;
use nutrilens_providers::{EstimatorError, EstimatorResult};
use serde_json::Value;

/// Input for a single estimator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateRequest {
    /// Meal description
    pub text: String,
    /// Locale of the description (`ja`, `en`, ...)
    pub locale: String,
    /// Optional meal photo
    pub image: Option<Vec<u8>>,
    /// MIME type of `image`
    pub mime: Option<String>,
    /// Prompt template version
    pub prompt_version: String,
}

impl EstimateRequest {
    /// Text-only request with the default prompt version
    pub fn new(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
            image: None,
            mime: None,
            prompt_version: DEFAULT_PROMPT_VERSION.to_owned(),
        }
    }

    /// Attach a photo
    #[must_use]
    pub fn with_image(mut self, image: Vec<u8>, mime: Option<String>) -> Self {
        self.image = Some(image);
        self.mime = mime;
        self
    }

    /// Override the prompt version
    #[must_use]
    pub fn with_prompt_version(mut self, prompt_version: impl Into<String>) -> Self {
        self.prompt_version = prompt_version.into();
        self
    }
}

/// Unvalidated estimator answer
#[derive(Debug, Clone, PartialEq)]
pub enum RawEstimate {
    /// Structured answer
    Json(Value),
    /// Free text, possibly fenced or malformed JSON
    Text(String),
}

/// Contract for generative estimator backends
#[async_trait]
pub trait EstimatorClient: Send + Sync {
    /// Unique backend identifier (e.g. "gemini")
    fn name(&self) -> &'static str;

    /// Model the backend calls
    fn model(&self) -> &str;

    /// Perform one estimate; callers own retries and timeouts
    async fn estimate(&self, request: &EstimateRequest) -> EstimatorResult<RawEstimate>;
}

/// Client used when no estimator is configured; every call is refused
#[derive(Debug, Clone, Default)]
pub struct DisabledEstimator {
    reason: String,
}

impl DisabledEstimator {
    /// Client that refuses every call with `reason`
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EstimatorClient for DisabledEstimator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn estimate(&self, _request: &EstimateRequest) -> EstimatorResult<RawEstimate> {
        Err(EstimatorError::Disabled {
            reason: self.reason.clone(),
        })
    }
}
