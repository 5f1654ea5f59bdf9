// ABOUTME: Shared test utilities for nutrilens integration tests
// ABOUTME: Quiet logging setup and a scripted estimator client for resilience scenarios
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `nutrilens`

use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use nutrilens::config::ModelInfo;
use nutrilens::llm::{EstimateRequest, EstimatorClient, RawEstimate};
use nutrilens::providers::{EstimatorProvider, ResilienceConfig, ResilientProvider};
use nutrilens_providers::{CircuitBreaker, CircuitBreakerConfig, EstimatorError, RetryPolicy};
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One scripted estimator reply
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub result: Result<RawEstimate, EstimatorError>,
}

impl Step {
    pub fn ok(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(RawEstimate::Json(value)),
        }
    }

    pub fn text(body: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(RawEstimate::Text(body.to_owned())),
        }
    }

    pub fn err(error: EstimatorError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::err(EstimatorError::from_status(status, "scripted"))
    }

    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Estimator that replays a fixed script and counts calls
///
/// Once the script is exhausted every call fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedEstimator {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedEstimator {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EstimatorClient for ScriptedEstimator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn estimate(&self, _request: &EstimateRequest) -> Result<RawEstimate, EstimatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    sleep(step.delay).await;
                }
                step.result
            }
            None => Err(EstimatorError::Transport {
                message: "script exhausted".to_owned(),
            }),
        }
    }
}

/// Fast retry policy: two attempts, 1 ms backoff, short timeouts
pub const fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 1,
        backoff_base_ms: 1,
        timeout_ms: 100,
        max_latency_ms: 1_000,
        retry_on_429: false,
    }
}

pub fn resilience(retry: RetryPolicy) -> ResilienceConfig {
    ResilienceConfig {
        enabled: true,
        retry,
        model: ModelInfo::default(),
        guardrail_version: "test-guardrails".to_owned(),
    }
}

pub fn breaker(threshold: u32) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::with_config(
        "test",
        CircuitBreakerConfig::new(threshold, Duration::from_secs(60)),
    ))
}

pub fn resilient(
    client: Arc<ScriptedEstimator>,
    breaker: Arc<CircuitBreaker>,
    config: ResilienceConfig,
) -> ResilientProvider {
    ResilientProvider::new(EstimatorProvider::new(client), breaker, config)
}

/// A well-formed estimator answer with known items
pub fn katsu_answer() -> Value {
    json!({
        "dish": "とんかつ定食",
        "confidence": 0.82,
        "items": [
            {"code": "pork_loin_cutlet", "qty": 120, "unit": "g"},
            {"code": "rice_cooked", "qty": 200, "unit": "g"},
            {"code": "cabbage_raw", "qty": 50, "unit": "g"}
        ]
    })
}
