// ABOUTME: Google Gemini estimator client over the generateContent REST API
// ABOUTME: Sends the strict-JSON nutrition prompt with optional inline image data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Estimator
//!
//! Implementation of [`EstimatorClient`] for Google's Gemini models.
//!
//! ## Configuration
//!
//! Set the `GEMINI_API_KEY` environment variable with your API key from
//! Google AI Studio. `AI_MODEL` selects the model (default `gemini-1.5-flash`).

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use nutrilens_core::constants::estimator::DEFAULT_MODEL;
use nutrilens_core::errors::AppError;
use nutrilens_providers::{EstimatorError, EstimatorResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{EstimateRequest, EstimatorClient, RawEstimate};

/// Environment variable for Gemini API key
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable selecting the model
const GEMINI_MODEL_ENV: &str = "AI_MODEL";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// MIME type assumed for photos without one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Instruction used when only a photo was supplied
const IMAGE_ONLY_INPUT: &str = "画像の料理を解析してください";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    candidate_count: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Strict-JSON nutrition prompt for a meal description
#[must_use]
pub fn build_prompt(input: &str) -> String {
    format!(
        "あなたは栄養士アシスタントです。以下の入力（料理名や説明）から料理名・信頼度・構成要素リストをJSONのみで返してください。\n\
         出力は以下の厳密JSON。前後の説明は禁止。\n\
         \n\
         {{\n  \"dish\": <料理名文字列>,\n  \"confidence\": <0から1の数値>,\n  \"items\": [\n    \
         {{\"code\": <既知なら食品コード/不明ならnull>, \"name\": <不明なら食品名文字列>, \"qty\": <数値>, \"unit\": \"<g|ml|piece>\"}}\n  ]\n}}\n\
         \n\
         入力:\n{input}"
    )
}

// ============================================================================
// Client Implementation
// ============================================================================

/// Google Gemini estimator client
pub struct GeminiEstimator {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiEstimator {
    /// Create a client with an API key and the default model
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: API_BASE_URL.to_owned(),
        }
    }

    /// Create a client from `GEMINI_API_KEY` and `AI_MODEL`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `GEMINI_API_KEY` is unset or empty
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
            })?;
        let client = Self::new(api_key);
        Ok(match env::var(GEMINI_MODEL_ENV) {
            Ok(model) if !model.trim().is_empty() => client.with_model(model.trim()),
            _ => client,
        })
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different API root (used by local stubs)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{method}?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(request: &EstimateRequest) -> GeminiRequest {
        let input = if request.text.trim().is_empty() && request.image.is_some() {
            IMAGE_ONLY_INPUT
        } else {
            request.text.as_str()
        };

        let mut parts = vec![ContentPart::Text {
            text: build_prompt(input),
        }];
        if let Some(image) = &request.image {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: request
                        .mime
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_owned()),
                    data: STANDARD.encode(image),
                },
            });
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                candidate_count: 1,
                response_mime_type: "application/json",
            },
        }
    }

    /// Extract the first text part of the first candidate
    fn extract_content(response: &GeminiResponse) -> EstimatorResult<String> {
        response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| {
                c.parts.iter().find_map(|part| match part {
                    ContentPart::Text { text } => Some(text.clone()),
                    ContentPart::InlineData { .. } => None,
                })
            })
            .ok_or_else(|| EstimatorError::InvalidResponse {
                reason: "no text content in Gemini response".to_owned(),
            })
    }

    /// Map an HTTP error status to the estimator taxonomy
    fn map_api_error(status: u16, response_text: &str) -> EstimatorError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);
        EstimatorError::from_status(status, message)
    }

    fn map_transport_error(error: &reqwest::Error) -> EstimatorError {
        if error.is_timeout() {
            EstimatorError::Timeout { timeout_ms: 0 }
        } else {
            EstimatorError::Transport {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl EstimatorClient for GeminiEstimator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model, has_image = request.image.is_some()))]
    async fn estimate(&self, request: &EstimateRequest) -> EstimatorResult<RawEstimate> {
        let body = Self::build_request(request);
        debug!("Sending estimate request to Gemini API");

        let response = self
            .client
            .post(self.build_url("generateContent"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(&e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Self::map_transport_error(&e))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response envelope");
            EstimatorError::InvalidResponse {
                reason: format!("Failed to parse Gemini response: {e}"),
            }
        })?;

        if let Some(api_error) = parsed.error {
            return Err(EstimatorError::Server {
                status: status.as_u16(),
                message: api_error.message,
            });
        }

        Self::extract_content(&parsed).map(RawEstimate::Text)
    }
}

impl Debug for GeminiEstimator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiEstimator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_input() {
        let prompt = build_prompt("親子丼");
        assert!(prompt.ends_with("入力:\n親子丼"));
        assert!(prompt.contains("\"unit\": \"<g|ml|piece>\""));
    }

    #[test]
    fn test_image_request_carries_inline_data() {
        let request =
            EstimateRequest::new("", "ja").with_image(vec![1, 2, 3], Some("image/png".to_owned()));
        let body = serde_json::to_value(GeminiEstimator::build_request(&request)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains(IMAGE_ONLY_INPUT));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_error_status_mapping() {
        let body = r#"{"error":{"message":"models/x is not found"}}"#;
        assert_eq!(
            GeminiEstimator::map_api_error(404, body),
            EstimatorError::NotFound {
                message: "models/x is not found".to_owned()
            }
        );
        assert!(matches!(
            GeminiEstimator::map_api_error(503, "busy"),
            EstimatorError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiEstimator::new("secret-key");
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
