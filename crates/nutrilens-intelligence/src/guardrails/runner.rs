// ABOUTME: Runs the four guardrail stages in order and stamps the guardrail version
// ABOUTME: Output mirrors a legacy nutrition block and breakdown for persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use nutrilens_core::constants::guardrails::DEFAULT_GUARDRAIL_VERSION;
use nutrilens_core::errors::GuardrailError;
use nutrilens_core::models::GuardedPayload;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{reconcile, sanitize, schema, zero_floor};
use super::{GuardrailContext, GuardrailOptions, LowCalorieMatcher};

/// Versioned guardrail pipeline
#[derive(Debug, Clone)]
pub struct GuardrailRunner {
    version: String,
    options: GuardrailOptions,
    low_cal: LowCalorieMatcher,
}

impl GuardrailRunner {
    /// Create a runner with explicit version, bounds, and allowlist
    pub fn new(
        version: impl Into<String>,
        options: GuardrailOptions,
        low_cal: LowCalorieMatcher,
    ) -> Self {
        Self {
            version: version.into(),
            options,
            low_cal,
        }
    }

    /// Runner with the default version, bounds, and base allowlist
    ///
    /// # Errors
    ///
    /// Propagates a failure to compile the base allowlist
    pub fn with_defaults() -> Result<Self, GuardrailError> {
        Ok(Self::new(
            DEFAULT_GUARDRAIL_VERSION,
            GuardrailOptions::default(),
            LowCalorieMatcher::new(None)?,
        ))
    }

    /// Guardrail release identifier
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Bounds used by the stages
    #[must_use]
    pub const fn options(&self) -> &GuardrailOptions {
        &self.options
    }

    /// Parse, sanitize, reconcile, and floor a raw payload
    ///
    /// # Errors
    ///
    /// Returns `GuardrailError::Schema` when the payload shape is unusable.
    /// Later stages never fail.
    #[instrument(skip(self, raw, context), fields(version = %self.version))]
    pub fn run(
        &self,
        raw: &Value,
        context: &GuardrailContext<'_>,
    ) -> Result<GuardedPayload, GuardrailError> {
        let parsed = schema::parse(raw)?;
        let sanitized = sanitize::sanitize(parsed, self.options.max_kcal);
        let reconciled = reconcile::reconcile(sanitized, self.options.reconcile_tolerance);
        let mut floored =
            zero_floor::zero_floor(reconciled, context.input_text, &self.options, &self.low_cal);

        floored.meta.insert(
            "guardrail_version".to_owned(),
            Value::String(self.version.clone()),
        );
        debug!(
            kcal = floored.totals.kcal,
            warnings = floored.warnings.len(),
            "Guardrails applied"
        );
        Ok(GuardedPayload::from_payload(floored))
    }
}
