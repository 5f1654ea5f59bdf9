// ABOUTME: Provider backed directly by the generative estimator client
// ABOUTME: One estimator call plus payload adaptation; no retries or fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use nutrilens_core::constants::estimator::DEFAULT_PROMPT_VERSION;
use nutrilens_core::errors::AppResult;
use nutrilens_providers::EstimatorResult;
use tracing::{debug, instrument};

use super::{AnalyzeRequest, NutritionProvider, ProviderOutput};
use crate::adapters::to_provider_payload;
use crate::llm::{EstimateRequest, EstimatorClient};

/// Single estimator call adapted into provider output
#[derive(Clone)]
pub struct EstimatorProvider {
    client: Arc<dyn EstimatorClient>,
    prompt_version: String,
}

impl EstimatorProvider {
    /// Provider over a client with the default prompt version
    #[must_use]
    pub fn new(client: Arc<dyn EstimatorClient>) -> Self {
        Self {
            client,
            prompt_version: DEFAULT_PROMPT_VERSION.to_owned(),
        }
    }

    /// Override the prompt version
    #[must_use]
    pub fn with_prompt_version(mut self, prompt_version: impl Into<String>) -> Self {
        self.prompt_version = prompt_version.into();
        self
    }

    /// Model the underlying client calls
    #[must_use]
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Call the estimator once and adapt its answer
    ///
    /// # Errors
    ///
    /// Returns the client's classified `EstimatorError` unchanged so callers
    /// can decide between retrying and falling back
    #[instrument(skip(self, request), fields(client = self.client.name()))]
    pub async fn estimate(&self, request: &AnalyzeRequest) -> EstimatorResult<ProviderOutput> {
        let mut call = EstimateRequest::new(request.text.clone(), request.locale.clone())
            .with_prompt_version(self.prompt_version.clone());
        if let Some(image) = &request.image {
            call = call.with_image(image.clone(), request.mime.clone());
        }

        let raw = self.client.estimate(&call).await?;
        let mut output = to_provider_payload(&raw, Some(&request.text));
        output.meta.insert("provider", NutritionProvider::name(self));
        output.meta.insert("client", self.client.name());
        output.meta.insert("model", self.client.model());
        debug!(items = output.items.len(), "Estimator answer adapted");
        Ok(output)
    }
}

#[async_trait]
impl NutritionProvider for EstimatorProvider {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> AppResult<ProviderOutput> {
        Ok(self.estimate(request).await?)
    }
}
