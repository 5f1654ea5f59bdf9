// ABOUTME: Analysis response cache with TTL, coarse capacity bound, and single-flight computation
// ABOUTME: Keys hash the normalized input together with every version that affects the answer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Cache
//!
//! ```rust,no_run
//! use nutrilens::cache::{cache_key, CacheKeyParts, ResponseCache};
//! use std::time::Duration;
//!
//! # async fn example() -> nutrilens::AppResult<()> {
//! let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 100);
//! let key = cache_key(&CacheKeyParts {
//!     text: "牛丼 並",
//!     locale: "ja",
//!     provider: "ai",
//!     model: "gemini-1.5-flash",
//!     model_version: "2025-09-25-a",
//!     prompt_version: "v1",
//!     guardrail_version: "2025-09-25-a",
//! });
//! let value = cache
//!     .get_or_compute(&key, async { Ok("computed".to_owned()) })
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Cache key derivation
pub mod key;
/// In-memory store with single-flight computation
pub mod memory;

pub use key::{cache_key, normalize_text, CacheKeyParts};
pub use memory::ResponseCache;
